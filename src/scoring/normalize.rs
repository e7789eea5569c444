use crate::error::{HviError, Result};
use crate::types::model::{Question, Scale};

/// Maps a raw answer onto 0..=100, where higher always means more mature.
pub fn normalize(question: &Question, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(HviError::InvalidInput(format!(
            "answer to question {} is not a number",
            question.id
        )));
    }

    let normalized = match question.scale {
        Scale::Likert => {
            check_range(question, value, 1.0, 5.0)?;
            (value - 1.0) / 4.0 * 100.0
        }
        Scale::Percent => {
            check_range(question, value, 0.0, 100.0)?;
            value
        }
        Scale::Binary => {
            if value != 0.0 && value != 1.0 {
                return Err(HviError::InvalidInput(format!(
                    "answer to question {} must be 0 or 1 (found {value})",
                    question.id
                )));
            }
            value * 100.0
        }
    };

    if question.reverse {
        Ok(100.0 - normalized)
    } else {
        Ok(normalized)
    }
}

fn check_range(question: &Question, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(HviError::InvalidInput(format!(
            "answer to question {} must be between {min} and {max} (found {value})",
            question.id
        )))
    }
}
