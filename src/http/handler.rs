//! HTTP handlers for the assessment API

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{AppState, SharedState};
use crate::analyze::{self, ReportOptions};
use crate::error::HviError;
use crate::journal::Activity;
use crate::types::model::{
    Assessment, AssessmentStatus, Organization, OrganizationInput, Question, QuestionInput,
    Subject, SubjectKind, Submission, User, UserInput,
};
use crate::types::report::{AssessmentReport, Dashboard};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

impl IntoResponse for HviError {
    fn into_response(self) -> Response {
        let status = match &self {
            HviError::NotFound { .. } | HviError::PathNotFound(_) => StatusCode::NOT_FOUND,
            HviError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HviError::Conflict(_) | HviError::DuplicateSubmission(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, HviError>;

/// Journals a change that is already saved. Failures are logged, not returned.
fn journal(state: &AppState, milestone: bool, activity: Activity) {
    let Ok(journal) = state.journal.lock() else {
        warn!("activity journal lock poisoned");
        return;
    };
    let event = activity.event.clone();
    let result = if milestone {
        journal.milestone(activity)
    } else {
        journal.record(activity)
    };
    if let Err(error) = result {
        warn!(%error, event = %event, "could not write activity journal");
    }
}

/// Liveness check
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// organizations

pub async fn list_organizations(State(state): State<SharedState>) -> Json<Vec<Organization>> {
    Json(state.store.read().await.organizations().to_vec())
}

pub async fn get_organization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Organization>> {
    Ok(Json(state.store.read().await.organization(&id)?.clone()))
}

pub async fn create_organization(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<OrganizationInput>,
) -> ApiResult<(StatusCode, Json<Organization>)> {
    let mut store = state.store.write().await;
    let organization = store.create_organization(input)?;
    store.save()?;
    journal(
        &state,
        false,
        Activity::new("organization.created", organization.id.as_str())
            .with_detail(organization.name.as_str()),
    );
    Ok((StatusCode::CREATED, Json(organization)))
}

pub async fn update_organization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<OrganizationInput>,
) -> ApiResult<Json<Organization>> {
    let mut store = state.store.write().await;
    let organization = store.update_organization(&id, input)?;
    store.save()?;
    journal(&state, false, Activity::new("organization.updated", id));
    Ok(Json(organization))
}

pub async fn delete_organization(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    store.remove_organization(&id)?;
    store.save()?;
    journal(&state, true, Activity::new("organization.removed", id));
    Ok(StatusCode::NO_CONTENT)
}

// users

pub async fn list_users(State(state): State<SharedState>) -> Json<Vec<User>> {
    Json(state.store.read().await.users().to_vec())
}

pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.store.read().await.user(&id)?.clone()))
}

pub async fn create_user(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<UserInput>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let mut store = state.store.write().await;
    let user = store.create_user(input)?;
    store.save()?;
    journal(&state, false, Activity::new("user.created", user.id.as_str()));
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UserInput>,
) -> ApiResult<Json<User>> {
    let mut store = state.store.write().await;
    let user = store.update_user(&id, input)?;
    store.save()?;
    journal(&state, false, Activity::new("user.updated", id));
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    store.remove_user(&id)?;
    store.save()?;
    journal(&state, true, Activity::new("user.removed", id));
    Ok(StatusCode::NO_CONTENT)
}

// questions

pub async fn list_questions(State(state): State<SharedState>) -> Json<Vec<Question>> {
    Json(state.store.read().await.questions().to_vec())
}

pub async fn get_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Question>> {
    Ok(Json(state.store.read().await.question(&id)?.clone()))
}

pub async fn create_question(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<QuestionInput>,
) -> ApiResult<(StatusCode, Json<Question>)> {
    let mut store = state.store.write().await;
    let question = store.create_question(input)?;
    store.save()?;
    journal(&state, false, Activity::new("question.created", question.id.as_str()));
    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn update_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<QuestionInput>,
) -> ApiResult<Json<Question>> {
    let mut store = state.store.write().await;
    let question = store.update_question(&id, input)?;
    store.save()?;
    journal(&state, false, Activity::new("question.updated", id));
    Ok(Json(question))
}

pub async fn delete_question(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    store.remove_question(&id)?;
    store.save()?;
    journal(&state, true, Activity::new("question.removed", id));
    Ok(StatusCode::NO_CONTENT)
}

// assessments

#[derive(Debug, Deserialize)]
pub struct AssessmentFilter {
    pub subject_kind: Option<SubjectKind>,
    pub subject_id: Option<String>,
}

pub async fn list_assessments(
    State(state): State<SharedState>,
    ApiQuery(filter): ApiQuery<AssessmentFilter>,
) -> Json<Vec<Assessment>> {
    let store = state.store.read().await;
    let assessments = store
        .assessments()
        .iter()
        .filter(|assessment| {
            filter
                .subject_kind
                .map_or(true, |kind| assessment.subject.kind == kind)
                && filter
                    .subject_id
                    .as_deref()
                    .map_or(true, |id| assessment.subject.id == id)
        })
        .cloned()
        .collect();
    Json(assessments)
}

pub async fn get_assessment(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Assessment>> {
    Ok(Json(state.store.read().await.assessment(&id)?.clone()))
}

pub async fn submit_assessment(
    State(state): State<SharedState>,
    ApiJson(submission): ApiJson<Submission>,
) -> ApiResult<(StatusCode, Json<Assessment>)> {
    let mut store = state.store.write().await;
    let assessment = store.submit(submission, &state.config)?;
    store.save()?;
    let (milestone, event) = match assessment.status {
        AssessmentStatus::Submitted => (true, "assessment.submitted"),
        AssessmentStatus::Draft => (false, "assessment.drafted"),
    };
    journal(
        &state,
        milestone,
        Activity::new(event, assessment.id.as_str()).with_subject(&assessment.subject),
    );
    Ok((StatusCode::CREATED, Json(assessment)))
}

pub async fn delete_assessment(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut store = state.store.write().await;
    let assessment = store.remove_assessment(&id)?;
    store.save()?;
    journal(
        &state,
        true,
        Activity::new("assessment.removed", id).with_subject(&assessment.subject),
    );
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub trend: bool,
    #[serde(default)]
    pub peers: bool,
}

pub async fn assessment_report(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> ApiResult<Json<AssessmentReport>> {
    let store = state.store.read().await;
    let options = ReportOptions {
        with_trend: query.trend,
        with_peers: query.peers,
    };
    Ok(Json(analyze::build_report(&store, &id, &state.config, options)?))
}

pub async fn dashboard_handler(
    State(state): State<SharedState>,
    ApiPath((kind, id)): ApiPath<(SubjectKind, String)>,
) -> ApiResult<Json<Dashboard>> {
    let store = state.store.read().await;
    let subject = Subject { kind, id };
    Ok(Json(analyze::dashboard(&store, &subject, &state.config)?))
}
