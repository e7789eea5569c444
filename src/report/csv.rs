use crate::error::{HviError, Result};
use crate::types::report::AssessmentReport;
use ::csv::Writer;

const HEADER: [&str; 9] = [
    "assessment_id",
    "subject",
    "submitted_at",
    "dimension",
    "name",
    "score",
    "level",
    "answered",
    "total",
];

/// One row per dimension, followed by an `overall` row.
pub fn to_csv(report: &AssessmentReport) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    let subject = report.subject.to_string();
    let submitted_at = report.submitted_at.to_rfc3339();
    for entry in &report.score.dimensions {
        writer.write_record([
            report.assessment_id.as_str(),
            subject.as_str(),
            submitted_at.as_str(),
            entry.dimension.key(),
            report.dimension_names[entry.dimension.index()].as_str(),
            entry
                .score
                .map(|score| format!("{score:.2}"))
                .unwrap_or_default()
                .as_str(),
            entry.maturity_level.as_deref().unwrap_or_default(),
            entry.answered.to_string().as_str(),
            entry.total.to_string().as_str(),
        ])?;
    }

    let answered: usize = report.score.dimensions.iter().map(|entry| entry.answered).sum();
    let total: usize = report.score.dimensions.iter().map(|entry| entry.total).sum();
    writer.write_record([
        report.assessment_id.as_str(),
        subject.as_str(),
        submitted_at.as_str(),
        "overall",
        format!("HVI {:.2}", report.score.hvi).as_str(),
        format!("{:.2}", report.score.maturity_score).as_str(),
        report.score.maturity_level.as_str(),
        answered.to_string().as_str(),
        total.to_string().as_str(),
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|error| HviError::Io(error.into_error()))?;
    String::from_utf8(bytes).map_err(|error| HviError::InvalidInput(error.to_string()))
}
