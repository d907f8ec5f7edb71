use axum::{
    extract::{Path, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::collector::{CollectorOptions, FeedbackSnapshot, PageView, VoteOutcome};
use crate::feedback::record::RecordScope;
use crate::models::feedback::Vote;
use crate::sessions::{lock, settle, PageSession, SharedSession};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PageRequest {
    pub pathname: String,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub vote: Vote,
}

#[derive(Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Deserialize, Default)]
pub struct SubmitRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Serialize)]
pub struct CommentResponse {
    pub truncated: bool,
    #[serde(flatten)]
    pub snapshot: FeedbackSnapshot,
}

fn snapshot_of(session: &SharedSession) -> Result<FeedbackSnapshot, AppError> {
    Ok(lock(session)?.collector().snapshot())
}

fn conflict(action: &str, state: &str) -> AppError {
    AppError::Conflict(format!("cannot {action} while feedback is {state}"))
}

/// PUT /api/v1/sessions/:id/page
pub async fn handle_navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<PageRequest>,
) -> Result<Json<FeedbackSnapshot>, AppError> {
    let pathname = req.pathname.trim();
    if !pathname.starts_with('/') {
        return Err(AppError::Validation(
            "pathname must start with '/'".to_string(),
        ));
    }

    let client_signature = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let (session, created) = state.sessions.get_or_start(id, || {
        let options = CollectorOptions {
            requires_comment: state.config.requires_comment,
            submit_latency: state.config.submit_latency(),
            client_signature,
            scope: RecordScope::Session(id),
        };
        PageSession::start(state.store.clone(), options, pathname)
    })?;
    if !created {
        lock(&session)?.navigate(pathname);
    }
    Ok(Json(snapshot_of(&session)?))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(snapshot_of(&session)?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.end(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/vote
pub async fn handle_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<FeedbackSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    let outcome = {
        let mut guard = lock(&session)?;
        let outcome = match guard.collector_mut().view() {
            PageView::Idle(idle) => idle.select_vote(req.vote)?,
            PageView::Voted(voted) => voted.select_vote(req.vote)?,
            other => return Err(conflict("vote", other.name())),
        };
        outcome
    };
    if let VoteOutcome::Submitting(pending) = outcome {
        settle(&session, pending).await?;
    }
    Ok(Json(snapshot_of(&session)?))
}

/// PUT /api/v1/sessions/:id/comment
pub async fn handle_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let session = state.sessions.get(id)?;
    let mut guard = lock(&session)?;
    let truncated = match guard.collector_mut().view() {
        PageView::Voted(mut voted) => voted.set_comment(&req.comment),
        other => return Err(conflict("comment", other.name())),
    };
    Ok(Json(CommentResponse {
        truncated,
        snapshot: guard.collector().snapshot(),
    }))
}

/// POST /api/v1/sessions/:id/submit
///
/// Responds once the minimum submit latency has passed.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<SubmitRequest>>,
) -> Result<Json<FeedbackSnapshot>, AppError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let session = state.sessions.get(id)?;
    let pending = {
        let mut guard = lock(&session)?;
        let pending = match guard.collector_mut().view() {
            PageView::Voted(voted) => voted.submit(req.comment.as_deref())?,
            other => return Err(conflict("submit", other.name())),
        };
        pending
    };
    settle(&session, pending).await?;
    Ok(Json(snapshot_of(&session)?))
}

/// POST /api/v1/sessions/:id/cancel
pub async fn handle_cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    let mut guard = lock(&session)?;
    match guard.collector_mut().view() {
        PageView::Voted(voted) => voted.cancel()?,
        other => return Err(conflict("cancel", other.name())),
    }
    Ok(Json(guard.collector().snapshot()))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    let mut guard = lock(&session)?;
    match guard.collector_mut().view() {
        PageView::Submitted(submitted) => submitted.reset()?,
        other => return Err(conflict("reset", other.name())),
    }
    Ok(Json(guard.collector().snapshot()))
}
