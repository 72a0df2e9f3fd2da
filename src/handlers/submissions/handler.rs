//! Submission handler implementations

use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::SubmissionDetail,
    services::{SubmissionService, submission_service::Dispatch},
    state::AppState,
};

use super::{
    request::SubmitForm,
    response::{SubmissionResponse, SubmissionsListResponse},
};

/// Submit an attempt at a task
///
/// Answer tasks respond with the graded submission as JSON. Code tasks respond
/// with the judge's event stream, byte for byte.
pub async fn create_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((slug, task)): Path<(String, i32)>,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = SubmitForm::from_multipart(multipart, state.config().catalog.max_code_bytes).await?;

    let response = match SubmissionService::submit(&state, &auth_user, &slug, task, form).await? {
        Dispatch::Graded(submission) => (StatusCode::CREATED, Json(submission)).into_response(),
        Dispatch::Relayed(handle) => {
            // The outcome task runs detached; it logs its own result
            (
                [
                    (CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
                    (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                ],
                Body::from_stream(handle.body),
            )
                .into_response()
        }
        Dispatch::Rejected(upstream) => passthrough(upstream),
    };

    Ok(response)
}

/// List the caller's submissions for a task
pub async fn list_task_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((slug, task)): Path<(String, i32)>,
) -> AppResult<Json<SubmissionsListResponse>> {
    let submissions =
        SubmissionService::history(state.db(), state.catalog(), &auth_user, &slug, task).await?;

    Ok(Json(SubmissionsListResponse {
        total: submissions.len(),
        submissions: submissions.into_iter().map(SubmissionResponse::from).collect(),
    }))
}

/// Get a submission with its test outcomes
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SubmissionDetail>> {
    let detail = SubmissionService::detail(state.db(), &auth_user, &id).await?;
    Ok(Json(detail))
}

/// Relay a judge refusal unchanged
fn passthrough(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();

    let mut response = Body::from_stream(upstream.bytes_stream()).into_response();
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}
