pub mod levels;
pub mod normalize;

use crate::error::{HviError, Result};
use crate::types::config::HviConfig;
use crate::types::dimension::Dimension;
use crate::types::model::{Answer, Question};
use crate::types::scoring::{DimensionScore, ScoreCard};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    weighted_sum: f64,
    weight_sum: f64,
    answered: usize,
}

/// Scores one set of answers against the question bank.
pub fn score_answers(
    questions: &[Question],
    answers: &[Answer],
    config: &HviConfig,
) -> Result<ScoreCard> {
    if answers.is_empty() {
        return Err(HviError::InvalidInput(
            "assessment has no answers".to_string(),
        ));
    }

    let by_id: HashMap<&str, &Question> = questions
        .iter()
        .map(|question| (question.id.as_str(), question))
        .collect();

    let mut seen = HashSet::new();
    let mut buckets = [Accumulator::default(); 4];
    for answer in answers {
        let question = by_id
            .get(answer.question_id.as_str())
            .ok_or_else(|| HviError::not_found("question", answer.question_id.clone()))?;
        if !question.active {
            return Err(HviError::InvalidInput(format!(
                "question {} is inactive",
                question.id
            )));
        }
        if !seen.insert(answer.question_id.as_str()) {
            return Err(HviError::InvalidInput(format!(
                "question {} answered more than once",
                answer.question_id
            )));
        }

        let value = normalize::normalize(question, answer.value)?;
        let bucket = &mut buckets[question.dimension.index()];
        bucket.weighted_sum += question.weight * value;
        bucket.weight_sum += question.weight;
        bucket.answered += 1;
    }

    let mut totals = [0usize; 4];
    for question in questions.iter().filter(|question| question.active) {
        totals[question.dimension.index()] += 1;
    }

    let maturity_bands = config.maturity_levels();
    let dimensions = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let bucket = buckets[dimension.index()];
            let total = totals[dimension.index()];
            let score = (bucket.answered > 0 && bucket.weight_sum > 0.0)
                .then(|| round2(bucket.weighted_sum / bucket.weight_sum));
            DimensionScore {
                dimension,
                score,
                answered: bucket.answered,
                total,
                completion: if total == 0 {
                    0.0
                } else {
                    bucket.answered as f64 / total as f64
                },
                maturity_level: score.map(|value| levels::classify(value, &maturity_bands)),
            }
        })
        .collect::<Vec<_>>();

    let maturity_score = overall(&dimensions, &config.weights())?;
    let hvi = round2(100.0 - maturity_score);
    debug!(maturity_score, hvi, "scored assessment");

    Ok(ScoreCard {
        dimensions,
        maturity_score,
        hvi,
        maturity_level: levels::classify(maturity_score, &maturity_bands),
        risk_level: levels::classify(hvi, &config.risk_levels()),
    })
}

/// Weighted mean of the dimensions that have a score, with the weights
/// re-normalized over those dimensions.
fn overall(dimensions: &[DimensionScore], weights: &[f64; 4]) -> Result<f64> {
    let (weighted_sum, weight_sum) = dimensions
        .iter()
        .filter_map(|entry| entry.score.map(|score| (entry.dimension, score)))
        .fold((0.0, 0.0), |(sum, total), (dimension, score)| {
            let weight = weights[dimension.index()];
            (sum + weight * score, total + weight)
        });

    if weight_sum <= 0.0 {
        return Err(HviError::InvalidInput(
            "no weighted dimension has answers".to_string(),
        ));
    }
    Ok(round2(weighted_sum / weight_sum))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
