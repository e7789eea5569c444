pub mod findings;
pub mod lint;
pub mod peers;
pub mod recommend;
pub mod trend;

use crate::error::{HviError, Result};
use crate::store::Store;
use crate::types::config::HviConfig;
use crate::types::model::Subject;
use crate::types::report::{AssessmentReport, Dashboard};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub with_trend: bool,
    pub with_peers: bool,
}

pub fn build_report(
    store: &Store,
    assessment_id: &str,
    config: &HviConfig,
    options: ReportOptions,
) -> Result<AssessmentReport> {
    let assessment = store.assessment(assessment_id)?;
    let card = assessment.score.clone().ok_or_else(|| {
        HviError::InvalidInput(format!(
            "assessment {assessment_id} has no score; finalize the draft first"
        ))
    })?;

    let trend = options.with_trend.then(|| {
        trend::trend(
            &assessment.subject,
            &store.history(&assessment.subject),
            config.trend_epsilon(),
        )
    });
    let peers = if options.with_peers {
        let group = peers::peer_group(store, &assessment.subject)?;
        let peer_cards = group
            .iter()
            .filter_map(|peer| store.latest(peer))
            .filter_map(|latest| latest.score.as_ref())
            .collect::<Vec<_>>();
        Some(peers::compare(&assessment.subject, &card, &peer_cards))
    } else {
        None
    };

    Ok(AssessmentReport {
        assessment_id: assessment.id.clone(),
        subject: assessment.subject.clone(),
        submitted_at: assessment.submitted_at,
        dimension_names: config.dimension_names().into_array(),
        findings: findings::score_findings(&card, config),
        recommendations: recommend::recommend(&card, config),
        score: card,
        trend,
        peers,
    })
}

/// Everything a dashboard shows for one subject.
pub fn dashboard(store: &Store, subject: &Subject, config: &HviConfig) -> Result<Dashboard> {
    store.subject_exists(subject)?;
    let history = store.history(subject);
    let latest = match history.last() {
        Some(assessment) => Some(build_report(
            store,
            &assessment.id,
            config,
            ReportOptions::default(),
        )?),
        None => None,
    };

    Ok(Dashboard {
        subject: subject.clone(),
        dimension_names: config.dimension_names().into_array(),
        assessment_count: history.len(),
        latest,
        trend: trend::trend(subject, &history, config.trend_epsilon()),
        peers: peers::compare_latest(store, subject)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::tests::{org_input, seeded_store, submission, uniform_answers};
    use crate::types::dimension::Dimension;
    use crate::types::model::{Assessment, AssessmentStatus, Submission};
    use crate::types::scoring::{DimensionScore, ScoreCard};
    use chrono::{DateTime, Duration, Utc};
    use tempfile::TempDir;

    /// A score card whose overall score is the plain mean of present dimensions.
    pub(crate) fn card(scores: [Option<f64>; 4]) -> ScoreCard {
        let present = scores.iter().flatten().copied().collect::<Vec<_>>();
        let maturity_score = if present.is_empty() {
            0.0
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        ScoreCard {
            dimensions: Dimension::ALL
                .iter()
                .map(|&dimension| DimensionScore {
                    dimension,
                    score: scores[dimension.index()],
                    answered: usize::from(scores[dimension.index()].is_some()),
                    total: 1,
                    completion: if scores[dimension.index()].is_some() {
                        1.0
                    } else {
                        0.0
                    },
                    maturity_level: None,
                })
                .collect(),
            maturity_score,
            hvi: 100.0 - maturity_score,
            maturity_level: "Unrated".to_string(),
            risk_level: "Unrated".to_string(),
        }
    }

    pub(crate) fn scored_assessment(
        id: &str,
        subject: &Subject,
        scores: [Option<f64>; 4],
        submitted_at: DateTime<Utc>,
    ) -> Assessment {
        Assessment {
            id: id.to_string(),
            subject: subject.clone(),
            answers: Vec::new(),
            status: AssessmentStatus::Submitted,
            submitted_at,
            fingerprint: id.to_string(),
            score: Some(card(scores)),
        }
    }

    #[test]
    fn report_includes_trend_and_peers_when_requested() {
        let dir = TempDir::new().expect("temp dir should be created");
        let config = HviConfig::default();
        let mut store = seeded_store(dir.path());
        let acme = store
            .create_organization(org_input("Acme", "finance"))
            .expect("acme");
        let bank = store
            .create_organization(org_input("Bank", "finance"))
            .expect("bank");

        let subject = Subject::organization(&acme.id);
        let earlier = Submission {
            submitted_at: Some(Utc::now() - Duration::days(90)),
            ..submission(subject.clone(), uniform_answers(&store, 2.0))
        };
        store.submit(earlier, &config).expect("earlier");
        let latest = store
            .submit(
                submission(subject.clone(), uniform_answers(&store, 4.0)),
                &config,
            )
            .expect("latest");
        let answers = uniform_answers(&store, 3.0);
        store
            .submit(submission(Subject::organization(&bank.id), answers), &config)
            .expect("peer");

        let options = ReportOptions {
            with_trend: true,
            with_peers: true,
        };
        let report = build_report(&store, &latest.id, &config, options).expect("report");
        let trend = report.trend.as_ref().expect("trend requested");
        assert_eq!(trend.points.len(), 2);
        assert!(trend.overall_delta.expect("two points") > 0.0);
        let peers = report.peers.as_ref().expect("peers requested");
        assert_eq!(peers.peer_count, 1);
        assert_eq!(report.dimension_names[0], "Leadership");

        let plain =
            build_report(&store, &latest.id, &config, ReportOptions::default()).expect("report");
        assert!(plain.trend.is_none());
        assert!(plain.peers.is_none());
    }

    #[test]
    fn draft_cannot_be_reported() {
        let dir = TempDir::new().expect("temp dir should be created");
        let config = HviConfig::default();
        let mut store = seeded_store(dir.path());
        let acme = store
            .create_organization(org_input("Acme", "finance"))
            .expect("acme");
        let draft = Submission {
            status: AssessmentStatus::Draft,
            ..submission(Subject::organization(&acme.id), Vec::new())
        };
        let stored = store.submit(draft, &config).expect("draft");
        let err = build_report(&store, &stored.id, &config, ReportOptions::default())
            .expect_err("draft has no score");
        assert!(matches!(err, HviError::InvalidInput(_)));
    }

    #[test]
    fn dashboard_for_subject_without_assessments_is_empty() {
        let dir = TempDir::new().expect("temp dir should be created");
        let mut store = seeded_store(dir.path());
        let acme = store
            .create_organization(org_input("Acme", "finance"))
            .expect("acme");
        let dashboard = dashboard(&store, &Subject::organization(&acme.id), &HviConfig::default())
            .expect("dashboard");
        assert_eq!(dashboard.assessment_count, 0);
        assert!(dashboard.latest.is_none());
        assert!(dashboard.trend.points.is_empty());
        assert!(dashboard.peers.is_none());
    }

    #[test]
    fn dashboard_for_unknown_subject_fails() {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = seeded_store(dir.path());
        let err = dashboard(&store, &Subject::user("ghost"), &HviConfig::default())
            .expect_err("unknown subject");
        assert!(matches!(err, HviError::NotFound { .. }));
    }
}
