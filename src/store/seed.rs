use crate::types::dimension::{Dimension, DimensionScheme};
use crate::types::model::{Question, Scale};

struct SeedQuestion {
    dimension: Dimension,
    text: &'static str,
    scale: Scale,
    reverse: bool,
}

const fn seed(
    dimension: Dimension,
    text: &'static str,
    scale: Scale,
    reverse: bool,
) -> SeedQuestion {
    SeedQuestion {
        dimension,
        text,
        scale,
        reverse,
    }
}

const CAPABILITY: [SeedQuestion; 12] = [
    seed(
        Dimension::D1,
        "Leadership sets and communicates clear digital continuity objectives.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D1,
        "A named executive owns human-risk and continuity outcomes.",
        Scale::Binary,
        false,
    ),
    seed(
        Dimension::D1,
        "Continuity planning is reviewed at leadership level at least yearly.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D2,
        "Critical systems have tested backup and restore procedures.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D2,
        "Share of accounts protected by multi-factor authentication.",
        Scale::Percent,
        false,
    ),
    seed(
        Dimension::D2,
        "Staff rely on unmanaged personal tools for business data.",
        Scale::Likert,
        true,
    ),
    seed(
        Dimension::D3,
        "Incident response runbooks exist and are exercised.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D3,
        "Access is revoked promptly when people change roles or leave.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D3,
        "Knowledge for key processes is documented outside individuals' heads.",
        Scale::Binary,
        false,
    ),
    seed(
        Dimension::D4,
        "Share of staff who completed awareness training this year.",
        Scale::Percent,
        false,
    ),
    seed(
        Dimension::D4,
        "People know whom to contact when something looks wrong.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D4,
        "Work depends on a single person who cannot be replaced quickly.",
        Scale::Likert,
        true,
    ),
];

const EXPOSURE: [SeedQuestion; 12] = [
    seed(
        Dimension::D1,
        "I verify unexpected requests for credentials or payments.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D1,
        "I reuse passwords across work and personal accounts.",
        Scale::Likert,
        true,
    ),
    seed(
        Dimension::D1,
        "I report suspicious messages instead of ignoring them.",
        Scale::Likert,
        false,
    ),
    seed(Dimension::D2, "My devices receive security updates automatically.", Scale::Binary, false),
    seed(
        Dimension::D2,
        "Share of my accounts protected by multi-factor authentication.",
        Scale::Percent,
        false,
    ),
    seed(
        Dimension::D2,
        "My important files are backed up somewhere I can restore from.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D3,
        "My team has a documented plan for losing access to key systems.",
        Scale::Likert,
        false,
    ),
    seed(
        Dimension::D3,
        "Responsibilities for shared accounts are clearly assigned.",
        Scale::Likert,
        false,
    ),
    seed(Dimension::D3, "Handover notes exist for the work only I perform.", Scale::Binary, false),
    seed(
        Dimension::D4,
        "My working environment lets me handle sensitive data privately.",
        Scale::Likert,
        false,
    ),
    seed(Dimension::D4, "I regularly work on untrusted public networks.", Scale::Likert, true),
    seed(Dimension::D4, "Physical access to my devices is controlled.", Scale::Likert, false),
];

/// Default question bank. Ids are stable (`d1.q1` ...) so submission files
/// can reference them directly.
pub fn default_questions(scheme: DimensionScheme) -> Vec<Question> {
    let source = match scheme {
        DimensionScheme::Capability => &CAPABILITY,
        DimensionScheme::Exposure => &EXPOSURE,
    };

    let mut counters = [0usize; 4];
    source
        .iter()
        .map(|entry| {
            counters[entry.dimension.index()] += 1;
            Question {
                id: format!("{}.q{}", entry.dimension.key(), counters[entry.dimension.index()]),
                dimension: entry.dimension,
                text: entry.text.to_string(),
                scale: entry.scale,
                weight: 1.0,
                reverse: entry.reverse,
                active: true,
            }
        })
        .collect()
}
