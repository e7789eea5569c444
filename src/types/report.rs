use crate::types::dimension::Dimension;
use crate::types::model::Subject;
use crate::types::scoring::{Score, ScoreCard};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub body: String,
    pub blocking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,
}

impl Finding {
    pub fn warning(id: &str, title: &str, body: String) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            body,
            blocking: false,
            dimension: None,
        }
    }

    pub fn blocking(id: &str, title: &str, body: String) -> Self {
        Self {
            blocking: true,
            ..Self::warning(id, title, body)
        }
    }

    pub fn for_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effort {
    Xs,
    S,
    M,
    L,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub id: String,
    pub dimension: Dimension,
    pub title: String,
    pub summary: String,
    pub impact: Impact,
    pub effort: Effort,
    /// Gap to the threshold multiplied by the dimension weight.
    pub priority: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub assessment_id: String,
    pub submitted_at: DateTime<Utc>,
    pub maturity_score: Score,
    pub hvi: Score,
    pub dimensions: [Option<Score>; 4],
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionDelta {
    pub dimension: Dimension,
    pub delta: Option<f64>,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trend {
    pub subject: Subject,
    pub points: Vec<TrendPoint>,
    /// Latest minus previous; `None` with fewer than two points.
    pub overall_delta: Option<f64>,
    pub direction: Option<Direction>,
    pub dimension_deltas: Vec<DimensionDelta>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionGap {
    pub dimension: Dimension,
    pub peer_mean: Option<Score>,
    /// Subject minus peer mean.
    pub gap: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeerComparison {
    pub subject: Subject,
    pub peer_count: usize,
    pub subject_score: Score,
    pub peer_mean: Option<Score>,
    pub peer_median: Option<Score>,
    /// Share of peers scoring strictly below the subject, 0..=100.
    pub percentile: Option<f64>,
    pub dimension_gaps: Vec<DimensionGap>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub assessment_id: String,
    pub subject: Subject,
    pub submitted_at: DateTime<Utc>,
    pub dimension_names: [String; 4],
    pub score: ScoreCard,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers: Option<PeerComparison>,
}

impl AssessmentReport {
    pub fn has_blocking(&self) -> bool {
        self.findings.iter().any(|finding| finding.blocking)
    }
}

pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|left, right| {
        right
            .priority
            .partial_cmp(&left.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| right.impact.cmp(&left.impact))
            .then_with(|| left.id.cmp(&right.id))
    });
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub subject: Subject,
    pub dimension_names: [String; 4],
    pub assessment_count: usize,
    pub latest: Option<AssessmentReport>,
    pub trend: Trend,
    pub peers: Option<PeerComparison>,
}
