//! The HTTP server.

pub mod pages;
pub mod progress;
pub mod state;
pub mod upload;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    response::Html,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{config::Config, prelude::*};

use self::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let max_upload = state.config().max_upload_bytes();
    Router::new()
        .route("/", get(home))
        .route(
            "/upload",
            post(upload::upload_pdf)
                .fallback(upload::upload_redirect)
                .layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/progress/:job", get(progress::job_progress))
        .route("/health", get(health))
        // Downloads are served straight out of the working directory, the
        // same tree the links rendered by the upload handler point into.
        .nest_service("/download", ServeDir::new("."))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the server until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let listen = config.listen;
    let state = AppState::new(config)?;
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("cannot listen on {listen}"))?;
    info!("serving on http://{listen}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

/// `GET /`: the upload form.
async fn home(State(state): State<AppState>) -> Html<String> {
    match state.pages().home() {
        Ok(page) => Html(page),
        Err(err) => {
            error!(error = ?err, "cannot render home page");
            Html(format!("{err:#}"))
        }
    }
}

/// `GET /health`: liveness check.
async fn health() -> &'static str {
    "OK"
}

/// Resolve when the user asks us to stop.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = ?err, "cannot listen for Ctrl-C");
    }
}
