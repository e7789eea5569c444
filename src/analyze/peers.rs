use crate::error::Result;
use crate::store::Store;
use crate::types::dimension::Dimension;
use crate::types::model::{Subject, SubjectKind};
use crate::types::report::{DimensionGap, PeerComparison};
use crate::types::scoring::ScoreCard;

/// Subjects an assessment is compared against.
///
/// Organizations are grouped by sector and users by organization. A subject
/// with no sector (or no organization) is compared with every other subject
/// of its kind that also has none.
pub fn peer_group(store: &Store, subject: &Subject) -> Result<Vec<Subject>> {
    let peers = match subject.kind {
        SubjectKind::Organization => {
            let sector = store.organization(&subject.id)?.sector.clone();
            store
                .organizations()
                .iter()
                .filter(|organization| organization.id != subject.id)
                .filter(|organization| same_group(&organization.sector, &sector))
                .map(|organization| Subject::organization(&organization.id))
                .collect()
        }
        SubjectKind::User => {
            let organization_id = store.user(&subject.id)?.organization_id.clone();
            store
                .users()
                .iter()
                .filter(|user| user.id != subject.id)
                .filter(|user| user.organization_id == organization_id)
                .map(|user| Subject::user(&user.id))
                .collect()
        }
    };
    Ok(peers)
}

fn same_group(candidate: &Option<String>, sector: &Option<String>) -> bool {
    match (candidate, sector) {
        (Some(left), Some(right)) => left.eq_ignore_ascii_case(right),
        (None, None) => true,
        _ => false,
    }
}

/// Compares the subject's latest score with each peer's latest score.
/// Returns `None` when the subject has no scored assessment.
pub fn compare_latest(store: &Store, subject: &Subject) -> Result<Option<PeerComparison>> {
    let Some(card) = store
        .latest(subject)
        .and_then(|assessment| assessment.score.as_ref())
    else {
        return Ok(None);
    };

    let peers = peer_group(store, subject)?;
    let peer_cards = peers
        .iter()
        .filter_map(|peer| store.latest(peer))
        .filter_map(|assessment| assessment.score.as_ref())
        .collect::<Vec<_>>();
    Ok(Some(compare(subject, card, &peer_cards)))
}

pub fn compare(subject: &Subject, card: &ScoreCard, peers: &[&ScoreCard]) -> PeerComparison {
    let overall = peers
        .iter()
        .map(|peer| peer.maturity_score)
        .collect::<Vec<_>>();

    let percentile = (!overall.is_empty()).then(|| {
        let below = overall
            .iter()
            .filter(|score| **score < card.maturity_score)
            .count();
        round2(below as f64 / overall.len() as f64 * 100.0)
    });

    let dimension_gaps = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let values = peers
                .iter()
                .filter_map(|peer| peer.score(dimension))
                .collect::<Vec<_>>();
            let peer_mean = mean(&values);
            let gap = match (card.score(dimension), peer_mean) {
                (Some(own), Some(peer)) => Some(round2(own - peer)),
                _ => None,
            };
            DimensionGap {
                dimension,
                peer_mean,
                gap,
            }
        })
        .collect();

    PeerComparison {
        subject: subject.clone(),
        peer_count: peers.len(),
        subject_score: card.maturity_score,
        peer_mean: mean(&overall),
        peer_median: median(&overall),
        percentile,
        dimension_gaps,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(round2(values.iter().sum::<f64>() / values.len() as f64))
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.total_cmp(right));
    let middle = sorted.len() / 2;
    let value = if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    };
    Some(round2(value))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
