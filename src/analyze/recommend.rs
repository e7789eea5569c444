use crate::types::config::HviConfig;
use crate::types::dimension::Dimension;
use crate::types::report::{sort_recommendations, Effort, Impact, Recommendation};
use crate::types::scoring::ScoreCard;

/// Below this a dimension needs groundwork rather than refinement.
const FOUNDATION_CEILING: f64 = 40.0;

struct CatalogEntry {
    title: &'static str,
    summary: &'static str,
    effort: Effort,
}

fn catalog(dimension: Dimension, foundational: bool) -> CatalogEntry {
    match (dimension, foundational) {
        (Dimension::D1, true) => CatalogEntry {
            title: "Establish Ownership",
            summary:
                "Name an accountable owner for human-risk and continuity, and publish objectives.",
            effort: Effort::S,
        },
        (Dimension::D1, false) => CatalogEntry {
            title: "Review Objectives Regularly",
            summary:
                "Put continuity objectives on the leadership review calendar and track follow-ups.",
            effort: Effort::Xs,
        },
        (Dimension::D2, true) => CatalogEntry {
            title: "Secure Core Systems",
            summary: "Enforce multi-factor authentication and verify that backups can be restored.",
            effort: Effort::M,
        },
        (Dimension::D2, false) => CatalogEntry {
            title: "Reduce Shadow Tooling",
            summary:
                "Inventory unmanaged tools holding business data and move it to managed services.",
            effort: Effort::M,
        },
        (Dimension::D3, true) => CatalogEntry {
            title: "Write Response Runbooks",
            summary:
                "Document incident and access-revocation procedures for critical processes.",
            effort: Effort::M,
        },
        (Dimension::D3, false) => CatalogEntry {
            title: "Exercise Runbooks",
            summary:
                "Run a quarterly tabletop exercise and write handover notes for single-owner work.",
            effort: Effort::S,
        },
        (Dimension::D4, true) => CatalogEntry {
            title: "Launch Awareness Training",
            summary:
                "Give everyone awareness training and a clear channel for reporting concerns.",
            effort: Effort::L,
        },
        (Dimension::D4, false) => CatalogEntry {
            title: "Remove Single Points of Failure",
            summary:
                "Cross-train people on work that depends on one person; refresh training yearly.",
            effort: Effort::M,
        },
    }
}

/// Recommendations for every scored dimension below the configured threshold,
/// highest priority first.
pub fn recommend(card: &ScoreCard, config: &HviConfig) -> Vec<Recommendation> {
    let threshold = config.recommendation_threshold();
    let names = config.dimension_names();

    let mut recommendations = card
        .dimensions
        .iter()
        .filter_map(|entry| entry.score.map(|score| (entry.dimension, score)))
        .filter(|(_, score)| *score < threshold)
        .map(|(dimension, score)| {
            let foundational = score < FOUNDATION_CEILING;
            let entry = catalog(dimension, foundational);
            let stage = if foundational { "foundation" } else { "strengthen" };
            Recommendation {
                id: format!("rec.{}.{}", dimension.key(), stage),
                dimension,
                title: format!("{}: {}", names.get(dimension), entry.title),
                summary: entry.summary.to_string(),
                impact: if foundational {
                    Impact::High
                } else {
                    Impact::Medium
                },
                effort: entry.effort,
                priority: ((threshold - score) * config.weight(dimension) * 100.0).round() / 100.0,
            }
        })
        .collect::<Vec<_>>();

    sort_recommendations(&mut recommendations);
    recommendations.truncate(config.max_recommendations());
    recommendations
}
