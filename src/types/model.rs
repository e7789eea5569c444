use crate::types::dimension::Dimension;
use crate::types::scoring::ScoreCard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Anything kept in a store collection.
pub trait Record {
    const KIND: &'static str;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub employees: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Record for Organization {
    const KIND: &'static str = "organization";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Assessor,
    #[default]
    Respondent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub organization_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }
}

/// How raw answers to a question are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// 1..=5
    #[default]
    Likert,
    /// 0..=100
    Percent,
    /// 0 or 1
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub dimension: Dimension,
    pub text: String,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Higher raw answers mean more exposure, not more maturity.
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_weight() -> f64 {
    1.0
}

fn default_active() -> bool {
    true
}

impl Record for Question {
    const KIND: &'static str = "question";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    User,
    Organization,
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Organization => f.write_str("organization"),
        }
    }
}

/// Who an assessment is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub kind: SubjectKind,
    pub id: String,
}

impl Subject {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::User,
            id: id.into(),
        }
    }

    pub fn organization(id: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::Organization,
            id: id.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Draft,
    #[default]
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub subject: Subject,
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub status: AssessmentStatus,
    pub submitted_at: DateTime<Utc>,
    pub fingerprint: String,
    #[serde(default)]
    pub score: Option<ScoreCard>,
}

impl Record for Assessment {
    const KIND: &'static str = "assessment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Incoming assessment, as read from a submission file or request body.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub subject: Subject,
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub status: AssessmentStatus,
    /// Backdated submissions are allowed for imports of historical data.
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationInput {
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub employees: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub organization_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionInput {
    pub dimension: Dimension,
    pub text: String,
    #[serde(default)]
    pub scale: Scale,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default = "default_active")]
    pub active: bool,
}
