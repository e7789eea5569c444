use crate::types::report::{AssessmentReport, PeerComparison, Trend};

pub fn to_markdown(report: &AssessmentReport) -> String {
    let mut output = String::new();
    output.push_str("# Assessment Report\n\n");
    output.push_str(&format!(
        "Assessment: {} ({})\n\nSubmitted: {}\n\n",
        report.assessment_id,
        report.subject,
        report.submitted_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "Maturity: {:.2} ({})\n\nHVI: {:.2} ({} risk)\n\n",
        report.score.maturity_score,
        report.score.maturity_level,
        report.score.hvi,
        report.score.risk_level
    ));

    output.push_str("## Dimension Scores\n\n");
    output.push_str("| Dimension | Score | Level | Completion |\n|---|---|---|---|\n");
    for entry in &report.score.dimensions {
        output.push_str(&format!(
            "| {} ({}) | {} | {} | {}/{} |\n",
            report.dimension_names[entry.dimension.index()],
            entry.dimension,
            entry
                .score
                .map(|score| format!("{score:.2}"))
                .unwrap_or_else(|| "-".to_string()),
            entry.maturity_level.as_deref().unwrap_or("-"),
            entry.answered,
            entry.total
        ));
    }
    output.push('\n');

    output.push_str("## Findings\n\n");
    if report.findings.is_empty() {
        output.push_str("- none\n\n");
    } else {
        for finding in &report.findings {
            output.push_str(&format!(
                "- [{}] {}: {}\n",
                if finding.blocking {
                    "blocking"
                } else {
                    "warning"
                },
                finding.title,
                finding.body
            ));
        }
        output.push('\n');
    }

    output.push_str("## Recommendations\n\n");
    if report.recommendations.is_empty() {
        output.push_str("- none\n");
    } else {
        for recommendation in &report.recommendations {
            output.push_str(&format!(
                "- {} ({:?}/{:?}, priority {:.2}): {}\n",
                recommendation.title,
                recommendation.impact,
                recommendation.effort,
                recommendation.priority,
                recommendation.summary
            ));
        }
    }

    if let Some(trend) = &report.trend {
        output.push('\n');
        output.push_str(&trend_markdown(trend, &report.dimension_names));
    }
    if let Some(peers) = &report.peers {
        output.push('\n');
        output.push_str(&peers_markdown(peers, &report.dimension_names));
    }

    output
}

pub fn trend_markdown(trend: &Trend, names: &[String; 4]) -> String {
    let mut output = String::new();
    output.push_str(&format!("## Trend for {}\n\n", trend.subject));
    if trend.points.is_empty() {
        output.push_str("- no scored assessments\n");
        return output;
    }

    output.push_str("| Submitted | Maturity | HVI |");
    for name in names {
        output.push_str(&format!(" {name} |"));
    }
    output.push_str("\n|---|---|---|---|---|---|---|\n");
    for point in &trend.points {
        output.push_str(&format!(
            "| {} | {:.2} | {:.2} |",
            point.submitted_at.format("%Y-%m-%d"),
            point.maturity_score,
            point.hvi
        ));
        for score in point.dimensions {
            output.push_str(&format!(" {} |", optional(score)));
        }
        output.push('\n');
    }

    if let (Some(delta), Some(direction)) = (trend.overall_delta, trend.direction) {
        output.push_str(&format!(
            "\nLatest change: {delta:+.2} ({direction:?})\n"
        ));
        for entry in &trend.dimension_deltas {
            if let (Some(delta), Some(direction)) = (entry.delta, entry.direction) {
                output.push_str(&format!(
                    "- {}: {delta:+.2} ({direction:?})\n",
                    names[entry.dimension.index()]
                ));
            }
        }
    }
    output
}

pub fn peers_markdown(peers: &PeerComparison, names: &[String; 4]) -> String {
    let mut output = String::new();
    output.push_str(&format!("## Peer Comparison for {}\n\n", peers.subject));
    if peers.peer_count == 0 {
        output.push_str("- no peers with scored assessments\n");
        return output;
    }

    output.push_str(&format!(
        "Peers: {}\n\nScore: {:.2} | peer mean {} | peer median {} | percentile {}\n\n",
        peers.peer_count,
        peers.subject_score,
        optional(peers.peer_mean),
        optional(peers.peer_median),
        optional(peers.percentile)
    ));
    for gap in &peers.dimension_gaps {
        output.push_str(&format!(
            "- {}: peer mean {}, gap {}\n",
            names[gap.dimension.index()],
            optional(gap.peer_mean),
            gap.gap
                .map(|value| format!("{value:+.2}"))
                .unwrap_or_else(|| "-".to_string())
        ));
    }
    output
}

fn optional(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;
    use crate::types::dimension::Dimension;
    use crate::types::model::Subject;
    use crate::types::report::DimensionGap;

    #[test]
    fn markdown_report_contains_sections() {
        let rendered = to_markdown(&sample_report());
        assert!(rendered.contains("# Assessment Report"));
        assert!(rendered.contains("## Dimension Scores"));
        assert!(rendered.contains("| Process (d3) | - | - | 0/1 |"));
        assert!(rendered.contains("## Recommendations"));
        assert!(rendered.contains("HVI: 37.50"));
        assert!(!rendered.contains("## Trend"));
    }

    #[test]
    fn empty_peer_comparison_says_so() {
        let names = sample_report().dimension_names;
        let peers = PeerComparison {
            subject: Subject::user("u1"),
            peer_count: 0,
            subject_score: 50.0,
            peer_mean: None,
            peer_median: None,
            percentile: None,
            dimension_gaps: vec![DimensionGap {
                dimension: Dimension::D1,
                peer_mean: None,
                gap: None,
            }],
        };
        assert!(peers_markdown(&peers, &names).contains("no peers"));
    }
}
