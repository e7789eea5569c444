use crate::types::config::HviConfig;
use crate::types::report::Finding;
use crate::types::scoring::ScoreCard;

pub fn score_findings(card: &ScoreCard, config: &HviConfig) -> Vec<Finding> {
    let names = config.dimension_names();
    let min_completion = config.min_completion();
    let mut findings = Vec::new();

    for entry in &card.dimensions {
        let name = names.get(entry.dimension);
        if entry.score.is_none() {
            findings.push(
                Finding::warning(
                    "score.missing_dimension",
                    "Dimension not scored",
                    format!(
                        "No question in {name} ({}) was answered; the overall score excludes it.",
                        entry.dimension
                    ),
                )
                .for_dimension(entry.dimension),
            );
        } else if entry.completion < min_completion {
            findings.push(
                Finding::warning(
                    "completion.low",
                    "Incomplete dimension",
                    format!(
                        "{name} is {:.0}% complete ({} of {} questions), below the {:.0}% minimum.",
                        entry.completion * 100.0,
                        entry.answered,
                        entry.total,
                        min_completion * 100.0
                    ),
                )
                .for_dimension(entry.dimension),
            );
        }
    }

    if let Some(top) = config.risk_levels().first() {
        if card.hvi >= top.min {
            findings.push(Finding::blocking(
                "risk.critical",
                "Highest risk level",
                format!(
                    "HVI {:.2} is in the {} band (>= {}).",
                    card.hvi, top.label, top.min
                ),
            ));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::tests::card;
    use crate::types::dimension::Dimension;

    #[test]
    fn missing_and_incomplete_dimensions_are_warnings() {
        let mut card = card([Some(60.0), None, Some(60.0), Some(60.0)]);
        card.dimensions[2].completion = 0.25;
        let findings = score_findings(&card, &HviConfig::default());

        assert!(findings.iter().any(|finding| {
            finding.id == "score.missing_dimension"
                && finding.dimension == Some(Dimension::D2)
                && !finding.blocking
        }));
        assert!(findings.iter().any(|finding| {
            finding.id == "completion.low" && finding.dimension == Some(Dimension::D3)
        }));
        assert!(!findings.iter().any(|finding| finding.blocking));
    }

    #[test]
    fn top_risk_band_is_blocking() {
        let card = card([Some(10.0); 4]);
        let findings = score_findings(&card, &HviConfig::default());
        assert!(findings
            .iter()
            .any(|finding| finding.id == "risk.critical" && finding.blocking));
    }
}
