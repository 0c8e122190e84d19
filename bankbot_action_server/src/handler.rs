use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use bankbot_core::{ActionError, ActionSet};
use std::sync::Arc;

use crate::types::*;

#[derive(Clone)]
pub struct AppState {
    pub(crate) actions: Arc<ActionSet>,
    pub(crate) app_name: String,
    pub(crate) app_version: String,
    pub(crate) start_time_ms: u64,
}

/// GET /health
pub async fn get_health(State(app): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok".to_string(),
        app: app.app_name.clone(),
        version: app.app_version.clone(),
        start_time_ms: app.start_time_ms,
    })
}

/// GET /actions
pub async fn get_actions(State(app): State<AppState>) -> impl IntoResponse {
    Json(
        app.actions
            .names()
            .into_iter()
            .map(|name| ActionInfo { name })
            .collect::<Vec<_>>(),
    )
}

/// POST /webhook
pub async fn run_action(
    State(app): State<AppState>,
    req: Result<Json<ActionCall>, JsonRejection>,
) -> impl IntoResponse {
    let Json(req) = match req {
        Ok(req) => req,
        Err(err) => {
            log::warn!("invalid action call: {err}");
            return (
                StatusCode::BAD_REQUEST,
                Json(ActionErrorResponse {
                    error: err.body_text(),
                    action_name: String::new(),
                }),
            )
                .into_response();
        }
    };

    log::info!(
        action = req.next_action.as_str(),
        sender = req.tracker.sender_id.as_str(),
        version = req.version.as_deref().unwrap_or_default();
        "run_action",
    );
    match app
        .actions
        .run(&req.next_action, req.tracker, req.domain)
        .await
    {
        Ok(output) => Json(output).into_response(),
        Err(err @ ActionError::NotFound(_)) => {
            log::warn!(action = req.next_action.as_str(); "{err}");
            (
                StatusCode::NOT_FOUND,
                Json(ActionErrorResponse {
                    error: err.to_string(),
                    action_name: req.next_action,
                }),
            )
                .into_response()
        }
        Err(err) => {
            log::error!(action = req.next_action.as_str(); "{err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionErrorResponse {
                    error: err.to_string(),
                    action_name: req.next_action,
                }),
            )
                .into_response()
        }
    }
}
