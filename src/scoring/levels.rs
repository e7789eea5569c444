use crate::types::config::LevelBand;

/// Returns the label of the first band whose `min` the score reaches.
/// Bands are expected in descending order; scores below every band get the
/// last label.
pub fn classify(score: f64, bands: &[LevelBand]) -> String {
    bands
        .iter()
        .find(|band| score >= band.min)
        .or_else(|| bands.last())
        .map(|band| band.label.clone())
        .unwrap_or_else(|| "Unrated".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::HviConfig;

    #[test]
    fn maturity_thresholds_are_inclusive() {
        let bands = HviConfig::default_maturity_levels();
        assert_eq!(classify(80.0, &bands), "Advanced");
        assert_eq!(classify(79.99, &bands), "Proficient");
        assert_eq!(classify(60.0, &bands), "Proficient");
        assert_eq!(classify(40.0, &bands), "Developing");
        assert_eq!(classify(0.0, &bands), "Beginning");
    }

    #[test]
    fn risk_thresholds_follow_hvi() {
        let bands = HviConfig::default_risk_levels();
        assert_eq!(classify(90.0, &bands), "Critical");
        assert_eq!(classify(50.0, &bands), "High");
        assert_eq!(classify(30.0, &bands), "Medium");
        assert_eq!(classify(10.0, &bands), "Low");
    }

    #[test]
    fn empty_table_is_unrated() {
        assert_eq!(classify(50.0, &[]), "Unrated");
    }
}
