use crate::types::dimension::Dimension;
use crate::types::model::{Assessment, Subject};
use crate::types::report::{DimensionDelta, Direction, Trend, TrendPoint};

/// Builds a trend from a subject's scored assessments. Input order does not
/// matter; points are sorted by submission time.
pub fn trend(subject: &Subject, history: &[&Assessment], epsilon: f64) -> Trend {
    let mut points = history
        .iter()
        .filter_map(|assessment| {
            assessment.score.as_ref().map(|score| TrendPoint {
                assessment_id: assessment.id.clone(),
                submitted_at: assessment.submitted_at,
                maturity_score: score.maturity_score,
                hvi: score.hvi,
                dimensions: Dimension::ALL.map(|dimension| score.score(dimension)),
            })
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|point| point.submitted_at);

    let pair = match points.as_slice() {
        [.., previous, latest] => Some((previous, latest)),
        _ => None,
    };

    let overall_delta =
        pair.map(|(previous, latest)| round2(latest.maturity_score - previous.maturity_score));
    let dimension_deltas = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let delta = pair.and_then(|(previous, latest)| {
                match (
                    previous.dimensions[dimension.index()],
                    latest.dimensions[dimension.index()],
                ) {
                    (Some(before), Some(after)) => Some(round2(after - before)),
                    _ => None,
                }
            });
            DimensionDelta {
                dimension,
                delta,
                direction: delta.map(|value| direction(value, epsilon)),
            }
        })
        .collect();

    Trend {
        subject: subject.clone(),
        direction: overall_delta.map(|value| direction(value, epsilon)),
        overall_delta,
        dimension_deltas,
        points,
    }
}

pub fn direction(delta: f64, epsilon: f64) -> Direction {
    if delta == 0.0 || delta.abs() < epsilon {
        Direction::Stable
    } else if delta > 0.0 {
        Direction::Improving
    } else {
        Direction::Declining
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
