use axum::{extract::State, Json};

use crate::dtos::{AskEnvelope, AskRequest, AskResponse};
use crate::middleware::UserId;
use crate::services::record_ask;
use crate::startup::AppState;
use crate::utils::ValidatedBody;
use service_core::error::AppError;

/// `POST /api/v1/ask-jiji`
///
/// Extractors run in declaration order, so the identity header is checked
/// before the body is read. The pool is touched only to prove the database
/// is reachable; the lease is handed back before answering.
#[tracing::instrument(skip_all, fields(user_id = %user_id.0))]
pub async fn ask_jiji(
    State(state): State<AppState>,
    user_id: UserId,
    ValidatedBody(request): ValidatedBody<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    let envelope = AskEnvelope::new(user_id, request);

    let lease = state.pool.acquire().await.inspect_err(|_| {
        record_ask("db_unavailable");
    })?;
    lease.release();

    tracing::info!(
        user_id = %envelope.user_id(),
        query_len = envelope.query().chars().count(),
        "Answered ask request"
    );
    record_ask("answered");

    Ok(Json(AskResponse::mock()))
}
