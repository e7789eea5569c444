use crate::journal::ActivityJournal;
use crate::store::Store;
use crate::types::config::HviConfig;
use crate::types::dimension::Dimension;
use crate::types::model::AssessmentStatus;
use crate::types::report::Finding;
use std::collections::{HashMap, HashSet};

/// Configuration and store integrity checks.
pub fn lint_findings(store: &Store, config: &HviConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if let Err(error) = config.validate() {
        findings.push(Finding::blocking(
            "config.invalid",
            "Invalid configuration",
            error.to_string(),
        ));
    }

    let names = config.dimension_names();
    for dimension in Dimension::ALL {
        let active = store
            .questions()
            .iter()
            .filter(|question| question.dimension == dimension && question.active)
            .count();
        if active == 0 {
            findings.push(
                Finding::blocking(
                    "questions.missing_dimension",
                    "Dimension has no active questions",
                    format!(
                        "{} ({dimension}) cannot be scored until it has an active question.",
                        names.get(dimension)
                    ),
                )
                .for_dimension(dimension),
            );
        }
    }

    let mut emails = HashMap::<String, &str>::new();
    for user in store.users() {
        if let Some(organization_id) = &user.organization_id {
            if store.organization(organization_id).is_err() {
                findings.push(Finding::blocking(
                    "users.dangling_organization",
                    "User references a missing organization",
                    format!("User {} points at organization {organization_id}.", user.id),
                ));
            }
        }
        if let Some(first) = emails.insert(user.email.trim().to_lowercase(), user.id.as_str()) {
            findings.push(Finding::blocking(
                "users.duplicate_email",
                "Duplicate user email",
                format!("Users {first} and {} share {}.", user.id, user.email),
            ));
        }
    }

    let question_ids = store
        .questions()
        .iter()
        .map(|question| question.id.as_str())
        .collect::<HashSet<_>>();
    for assessment in store.assessments() {
        if store.subject_exists(&assessment.subject).is_err() {
            findings.push(Finding::blocking(
                "assessments.dangling_subject",
                "Assessment references a missing subject",
                format!(
                    "Assessment {} belongs to {}, which does not exist.",
                    assessment.id, assessment.subject
                ),
            ));
        }
        let unknown = assessment
            .answers
            .iter()
            .filter(|answer| !question_ids.contains(answer.question_id.as_str()))
            .map(|answer| answer.question_id.clone())
            .collect::<Vec<_>>();
        if !unknown.is_empty() {
            findings.push(Finding::blocking(
                "assessments.unknown_question",
                "Assessment answers unknown questions",
                format!(
                    "Assessment {} answers: {}.",
                    assessment.id,
                    unknown.join(", ")
                ),
            ));
        }
        if assessment.status == AssessmentStatus::Submitted && assessment.score.is_none() {
            findings.push(Finding::warning(
                "assessments.unscored",
                "Submitted assessment has no score",
                format!("Assessment {} should be rescored.", assessment.id),
            ));
        }
    }

    for organization in store.organizations() {
        if organization.sector.is_none() {
            findings.push(Finding::warning(
                "organizations.missing_sector",
                "Organization has no sector",
                format!(
                    "{} ({}) is only compared with other organizations without a sector.",
                    organization.name, organization.id
                ),
            ));
        }
    }

    findings
}

/// Checks that the activity journal parses and that every assessment it
/// reports as submitted is either stored or was later removed.
pub fn journal_findings(store: &Store, journal: &ActivityJournal) -> Vec<Finding> {
    let entries = match journal.entries() {
        Ok(entries) => entries,
        Err(error) => {
            return vec![Finding::warning(
                "journal.unreadable",
                "Activity journal cannot be read",
                error.to_string(),
            )]
        }
    };

    let removed = entries
        .iter()
        .filter(|entry| entry.event == "assessment.removed")
        .map(|entry| entry.entity.as_str())
        .collect::<HashSet<_>>();
    let mut missing = entries
        .iter()
        .filter(|entry| entry.event == "assessment.submitted")
        .map(|entry| entry.entity.as_str())
        .filter(|id| !removed.contains(id) && store.assessment(id).is_err())
        .collect::<Vec<_>>();
    missing.sort_unstable();
    missing.dedup();

    missing
        .into_iter()
        .map(|id| {
            Finding::warning(
                "journal.unknown_assessment",
                "Journal records a submission that is not stored",
                format!("Assessment {id} is journaled as submitted but missing from the store."),
            )
        })
        .collect()
}
