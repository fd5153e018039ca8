//! Job progress queries.

use axum::{
    extract::{Path as UrlPath, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{job::Job, prelude::*, server::state::AppState};

/// `GET /progress/:job`: relay the pipeline's progress file.
///
/// The pipeline rewrites `progress_<job>.json` in the job's output
/// directory as it works; we pass it through untouched so clients can
/// poll it. 404 until the pipeline has written anything.
pub async fn job_progress(
    State(state): State<AppState>,
    UrlPath(job_name): UrlPath<String>,
) -> Response {
    let job = match Job::from_base_name(state.config(), &job_name) {
        Ok(job) => job,
        Err(err) => {
            debug!(error = ?err, "rejected progress query");
            return StatusCode::NOT_FOUND.into_response();
        }
    };
    match tokio::fs::read(job.progress_path()).await {
        Ok(body) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
