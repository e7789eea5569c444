use crate::types::dimension::Dimension;
use serde::{Deserialize, Serialize};

/// Scores are on a 0..=100 scale.
pub type Score = f64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    /// `None` when no question of this dimension was answered.
    pub score: Option<Score>,
    pub answered: usize,
    pub total: usize,
    pub completion: f64,
    pub maturity_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Always four entries, ordered D1..D4.
    pub dimensions: Vec<DimensionScore>,
    pub maturity_score: Score,
    /// Human Vulnerability Index: 100 minus the overall maturity.
    pub hvi: Score,
    pub maturity_level: String,
    pub risk_level: String,
}

impl ScoreCard {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.dimensions
            .iter()
            .find(|entry| entry.dimension == dimension)
    }

    pub fn score(&self, dimension: Dimension) -> Option<Score> {
        self.dimension(dimension).and_then(|entry| entry.score)
    }
}
