pub mod csv;
pub mod json;
pub mod md;

use crate::error::HviError;
use crate::types::report::AssessmentReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
    Csv,
}

pub fn render(report: &AssessmentReport, format: OutputFormat) -> Result<String, HviError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(HviError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
        OutputFormat::Csv => csv::to_csv(report),
    }
}
