pub mod collection;
pub mod seed;

use crate::error::{HviError, Result};
use crate::scoring;
use crate::types::config::HviConfig;
use crate::types::model::{
    new_id, Answer, Assessment, AssessmentStatus, Organization, OrganizationInput, Question,
    QuestionInput, Subject, SubjectKind, Submission, User, UserInput,
};
use chrono::Utc;
use collection::Collection;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const ORGANIZATIONS_FILE: &str = "organizations.json";
pub const USERS_FILE: &str = "users.json";
pub const QUESTIONS_FILE: &str = "questions.json";
pub const ASSESSMENTS_FILE: &str = "assessments.json";

/// File-backed repository for the four entity collections.
#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    organizations: Collection<Organization>,
    users: Collection<User>,
    questions: Collection<Question>,
    assessments: Collection<Assessment>,
}

impl Store {
    pub fn open(dir: &Path) -> Result<Self> {
        let store = Self {
            dir: dir.to_path_buf(),
            organizations: Collection::load(dir.join(ORGANIZATIONS_FILE))?,
            users: Collection::load(dir.join(USERS_FILE))?,
            questions: Collection::load(dir.join(QUESTIONS_FILE))?,
            assessments: Collection::load(dir.join(ASSESSMENTS_FILE))?,
        };
        debug!(
            dir = %dir.display(),
            organizations = store.organizations.len(),
            users = store.users.len(),
            questions = store.questions.len(),
            assessments = store.assessments.len(),
            "store opened"
        );
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists every dirty collection. On failure, unsaved changes are
    /// dropped so memory matches what is on disk.
    pub fn save(&mut self) -> Result<()> {
        let result = self.save_collections();
        if let Err(error) = &result {
            warn!(dir = %self.dir.display(), %error, "save failed, discarding unsaved changes");
            self.organizations.revert();
            self.users.revert();
            self.questions.revert();
            self.assessments.revert();
        }
        result
    }

    fn save_collections(&mut self) -> Result<()> {
        self.organizations.save()?;
        self.users.save()?;
        self.questions.save()?;
        self.assessments.save()
    }

    // organizations

    pub fn organizations(&self) -> &[Organization] {
        self.organizations.all()
    }

    pub fn organization(&self, id: &str) -> Result<&Organization> {
        self.organizations.get(id)
    }

    pub fn create_organization(&mut self, input: OrganizationInput) -> Result<Organization> {
        require_text("organization name", &input.name)?;
        let organization = Organization {
            id: new_id(),
            name: input.name.trim().to_string(),
            sector: normalize_optional(input.sector),
            employees: input.employees,
            created_at: Utc::now(),
        };
        self.organizations.insert(organization.clone())?;
        Ok(organization)
    }

    pub fn update_organization(
        &mut self,
        id: &str,
        input: OrganizationInput,
    ) -> Result<Organization> {
        require_text("organization name", &input.name)?;
        let existing = self.organizations.get(id)?;
        let updated = Organization {
            name: input.name.trim().to_string(),
            sector: normalize_optional(input.sector),
            employees: input.employees,
            ..existing.clone()
        };
        self.organizations.replace(updated.clone())?;
        Ok(updated)
    }

    pub fn remove_organization(&mut self, id: &str) -> Result<Organization> {
        self.organizations.get(id)?;
        let members = self
            .users
            .all()
            .iter()
            .filter(|user| user.organization_id.as_deref() == Some(id))
            .count();
        if members > 0 {
            return Err(HviError::Conflict(format!(
                "organization {id} still has {members} user(s)"
            )));
        }
        if self.has_assessments(&Subject::organization(id)) {
            return Err(HviError::Conflict(format!(
                "organization {id} still has assessments"
            )));
        }
        self.organizations.remove(id)
    }

    // users

    pub fn users(&self) -> &[User] {
        self.users.all()
    }

    pub fn user(&self, id: &str) -> Result<&User> {
        self.users.get(id)
    }

    pub fn create_user(&mut self, input: UserInput) -> Result<User> {
        let email = self.check_user_input(&input, None)?;
        let user = User {
            id: new_id(),
            name: input.name.trim().to_string(),
            email,
            role: input.role,
            organization_id: input.organization_id,
            created_at: Utc::now(),
        };
        self.users.insert(user.clone())?;
        Ok(user)
    }

    pub fn update_user(&mut self, id: &str, input: UserInput) -> Result<User> {
        let existing = self.users.get(id)?.clone();
        let email = self.check_user_input(&input, Some(id))?;
        let updated = User {
            name: input.name.trim().to_string(),
            email,
            role: input.role,
            organization_id: input.organization_id,
            ..existing
        };
        self.users.replace(updated.clone())?;
        Ok(updated)
    }

    pub fn remove_user(&mut self, id: &str) -> Result<User> {
        self.users.get(id)?;
        if self.has_assessments(&Subject::user(id)) {
            return Err(HviError::Conflict(format!("user {id} still has assessments")));
        }
        self.users.remove(id)
    }

    /// Returns the normalized (trimmed, lowercased) email.
    fn check_user_input(&self, input: &UserInput, current_id: Option<&str>) -> Result<String> {
        require_text("user name", &input.name)?;
        let email = input.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(HviError::InvalidInput(format!(
                "invalid email address: {}",
                input.email
            )));
        }
        if let Some(taken) = self
            .users
            .all()
            .iter()
            .find(|user| user.email == email && Some(user.id.as_str()) != current_id)
        {
            return Err(HviError::Conflict(format!(
                "email {email} already belongs to user {}",
                taken.id
            )));
        }
        if let Some(organization_id) = &input.organization_id {
            self.organizations.get(organization_id)?;
        }
        Ok(email)
    }

    // questions

    pub fn questions(&self) -> &[Question] {
        self.questions.all()
    }

    pub fn question(&self, id: &str) -> Result<&Question> {
        self.questions.get(id)
    }

    pub fn create_question(&mut self, input: QuestionInput) -> Result<Question> {
        check_question_input(&input)?;
        let question = Question {
            id: new_id(),
            dimension: input.dimension,
            text: input.text.trim().to_string(),
            scale: input.scale,
            weight: input.weight,
            reverse: input.reverse,
            active: input.active,
        };
        self.questions.insert(question.clone())?;
        Ok(question)
    }

    /// Answered questions keep their scale and dimension; old answers would
    /// otherwise be rescored against a different meaning.
    pub fn update_question(&mut self, id: &str, input: QuestionInput) -> Result<Question> {
        check_question_input(&input)?;
        let existing = self.questions.get(id)?;
        let reshaped = existing.scale != input.scale || existing.dimension != input.dimension;
        if reshaped && self.is_answered(id) {
            return Err(HviError::Conflict(format!(
                "question {id} is referenced by assessments; its scale and dimension are fixed"
            )));
        }
        let updated = Question {
            id: id.to_string(),
            dimension: input.dimension,
            text: input.text.trim().to_string(),
            scale: input.scale,
            weight: input.weight,
            reverse: input.reverse,
            active: input.active,
        };
        self.questions.replace(updated.clone())?;
        Ok(updated)
    }

    pub fn set_question_active(&mut self, id: &str, active: bool) -> Result<Question> {
        let mut question = self.questions.get(id)?.clone();
        question.active = active;
        self.questions.replace(question.clone())?;
        Ok(question)
    }

    /// Questions that have been answered cannot be removed, only deactivated.
    pub fn remove_question(&mut self, id: &str) -> Result<Question> {
        self.questions.get(id)?;
        if self.is_answered(id) {
            return Err(HviError::Conflict(format!(
                "question {id} is referenced by assessments; deactivate it instead"
            )));
        }
        self.questions.remove(id)
    }

    /// Inserts questions whose ids are not present yet. Returns how many were added.
    pub fn seed_questions(&mut self, questions: Vec<Question>) -> Result<usize> {
        let mut added = 0;
        for question in questions {
            if !self.questions.contains(&question.id) {
                self.questions.insert(question)?;
                added += 1;
            }
        }
        Ok(added)
    }

    // assessments

    pub fn assessments(&self) -> &[Assessment] {
        self.assessments.all()
    }

    pub fn assessment(&self, id: &str) -> Result<&Assessment> {
        self.assessments.get(id)
    }

    pub fn remove_assessment(&mut self, id: &str) -> Result<Assessment> {
        self.assessments.remove(id)
    }

    pub fn subject_exists(&self, subject: &Subject) -> Result<()> {
        match subject.kind {
            SubjectKind::User => self.users.get(&subject.id).map(|_| ()),
            SubjectKind::Organization => self.organizations.get(&subject.id).map(|_| ()),
        }
    }

    /// Validates, scores and stores a submission. Drafts are validated but
    /// stored unscored.
    pub fn submit(&mut self, submission: Submission, config: &HviConfig) -> Result<Assessment> {
        self.subject_exists(&submission.subject)?;
        let fingerprint = fingerprint(&submission.subject, &submission.answers);

        let score = match submission.status {
            AssessmentStatus::Submitted => {
                self.check_duplicate(&fingerprint)?;
                Some(scoring::score_answers(
                    self.questions.all(),
                    &submission.answers,
                    config,
                )?)
            }
            AssessmentStatus::Draft => {
                if !submission.answers.is_empty() {
                    scoring::score_answers(self.questions.all(), &submission.answers, config)?;
                }
                None
            }
        };

        let assessment = Assessment {
            id: new_id(),
            subject: submission.subject,
            answers: submission.answers,
            status: submission.status,
            submitted_at: submission.submitted_at.unwrap_or_else(Utc::now),
            fingerprint,
            score,
        };
        self.assessments.insert(assessment.clone())?;
        info!(
            id = %assessment.id,
            subject = %assessment.subject,
            status = ?assessment.status,
            "assessment stored"
        );
        Ok(assessment)
    }

    /// Turns a draft into a scored submission.
    pub fn finalize(&mut self, id: &str, config: &HviConfig) -> Result<Assessment> {
        let mut assessment = self.assessments.get(id)?.clone();
        if assessment.status == AssessmentStatus::Submitted {
            return Err(HviError::Conflict(format!(
                "assessment {id} is already submitted"
            )));
        }
        self.check_duplicate(&assessment.fingerprint)?;
        assessment.score = Some(scoring::score_answers(
            self.questions.all(),
            &assessment.answers,
            config,
        )?);
        assessment.status = AssessmentStatus::Submitted;
        assessment.submitted_at = Utc::now();
        self.assessments.replace(assessment.clone())?;
        Ok(assessment)
    }

    /// Recomputes stored scores, e.g. after weights or thresholds changed.
    /// A question deactivated since submission still counts for the
    /// assessments that answered it. Nothing is replaced unless every
    /// assessment rescores.
    pub fn rescore(&mut self, config: &HviConfig) -> Result<usize> {
        let mut rescored = Vec::new();
        for assessment in self
            .assessments
            .all()
            .iter()
            .filter(|assessment| assessment.status == AssessmentStatus::Submitted)
        {
            let answered = assessment
                .answers
                .iter()
                .map(|answer| answer.question_id.as_str())
                .collect::<HashSet<_>>();
            let questions = self
                .questions
                .all()
                .iter()
                .map(|question| Question {
                    active: question.active || answered.contains(question.id.as_str()),
                    ..question.clone()
                })
                .collect::<Vec<_>>();
            let score = scoring::score_answers(&questions, &assessment.answers, config)?;
            rescored.push(Assessment {
                score: Some(score),
                ..assessment.clone()
            });
        }

        let count = rescored.len();
        for assessment in rescored {
            self.assessments.replace(assessment)?;
        }
        Ok(count)
    }

    /// Scored submissions for one subject, oldest first.
    pub fn history(&self, subject: &Subject) -> Vec<&Assessment> {
        let mut history = self
            .assessments
            .all()
            .iter()
            .filter(|assessment| {
                assessment.subject == *subject
                    && assessment.status == AssessmentStatus::Submitted
                    && assessment.score.is_some()
            })
            .collect::<Vec<_>>();
        history.sort_by_key(|assessment| assessment.submitted_at);
        history
    }

    pub fn latest(&self, subject: &Subject) -> Option<&Assessment> {
        self.history(subject).last().copied()
    }

    fn is_answered(&self, question_id: &str) -> bool {
        self.assessments.all().iter().any(|assessment| {
            assessment
                .answers
                .iter()
                .any(|answer| answer.question_id == question_id)
        })
    }

    fn has_assessments(&self, subject: &Subject) -> bool {
        self.assessments
            .all()
            .iter()
            .any(|assessment| assessment.subject == *subject)
    }

    fn check_duplicate(&self, fingerprint: &str) -> Result<()> {
        match self.assessments.all().iter().find(|assessment| {
            assessment.status == AssessmentStatus::Submitted
                && assessment.fingerprint == fingerprint
        }) {
            Some(existing) => Err(HviError::DuplicateSubmission(existing.id.clone())),
            None => Ok(()),
        }
    }
}

/// SHA-256 over the subject and the answers sorted by question id.
pub fn fingerprint(subject: &Subject, answers: &[Answer]) -> String {
    let mut sorted = answers.iter().collect::<Vec<_>>();
    sorted.sort_by(|left, right| left.question_id.cmp(&right.question_id));

    let mut hasher = Sha256::new();
    hasher.update(subject.to_string().as_bytes());
    for answer in sorted {
        hasher.update(format!("\n{}={}", answer.question_id, answer.value).as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn check_question_input(input: &QuestionInput) -> Result<()> {
    require_text("question text", &input.text)?;
    if !input.weight.is_finite() || input.weight <= 0.0 {
        return Err(HviError::InvalidInput(format!(
            "question weight must be positive (found {})",
            input.weight
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(HviError::InvalidInput(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !email.contains(' ')
        }
        None => false,
    }
}
