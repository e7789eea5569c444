//! HTTP server for the assessment API

use super::handler::{
    assessment_report, create_organization, create_question, create_user, dashboard_handler,
    delete_assessment, delete_organization, delete_question, delete_user, get_assessment,
    get_organization, get_question, get_user, health_handler, list_assessments,
    list_organizations, list_questions, list_users, submit_assessment, update_organization,
    update_question, update_user,
};
use super::SharedState;
use crate::error::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the API router over shared state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/organizations",
            get(list_organizations).post(create_organization),
        )
        .route(
            "/api/organizations/:id",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/questions", get(list_questions).post(create_question))
        .route(
            "/api/questions/:id",
            get(get_question).put(update_question).delete(delete_question),
        )
        .route(
            "/api/assessments",
            get(list_assessments).post(submit_assessment),
        )
        .route(
            "/api/assessments/:id",
            get(get_assessment).delete(delete_assessment),
        )
        .route("/api/assessments/:id/report", get(assessment_report))
        .route("/api/dashboard/:kind/:id", get(dashboard_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server managing the assessment API
pub struct HttpServer {
    state: SharedState,
    bind: String,
    port: u16,
}

impl HttpServer {
    pub fn new(state: SharedState, bind: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            bind: bind.into(),
            port,
        }
    }

    /// Serve until ctrl-c.
    pub async fn start(&self) -> Result<()> {
        let app = router(Arc::clone(&self.state));
        let addr = format!("{}:{}", self.bind, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("assessment API listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "could not install ctrl-c handler");
        std::future::pending::<()>().await;
    }
}
