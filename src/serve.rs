//! HTTP server.
//!
//! ```text
//! GET /               home page (stored, revalidated periodically)
//! GET /?pages=N       listing after N pages, rendered per request
//! GET /post/{slug}    stored post, or the loading page while it is generated
//! ```
//!
//! Everything else is a 404 page. Requests are traced with
//! [`TraceLayer`]; the server shuts down gracefully on Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::fallback;
use crate::generate::build_home;
use crate::prismic::ContentError;
use crate::render::{DetailState, PageContext, render_error, render_not_found, render_post};
use crate::revalidate;
use crate::state::AppState;
use crate::store::PostSlot;

/// Request failure, rendered as an HTML error page.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("not found")]
    NotFound { ctx: Arc<PageContext> },
    #[error("content API error: {source}")]
    Upstream {
        ctx: Arc<PageContext>,
        source: ContentError,
    },
    #[error("could not generate post: {message}")]
    Resolution {
        ctx: Arc<PageContext>,
        message: String,
    },
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Resolution { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = match &self {
            Self::NotFound { ctx } => render_not_found(ctx),
            Self::Upstream { ctx, source } => {
                tracing::error!(error = %source, "content API request failed");
                render_error(ctx, &source.to_string())
            }
            Self::Resolution { ctx, message } => render_error(ctx, message),
        };
        (status, Html(page.into_string())).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct HomeQuery {
    pages: Option<usize>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/post/{slug}", get(post))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, ServeError> {
    let pages = query.pages.unwrap_or(1);
    if pages <= 1
        && let Some(html) = state.store().home()
    {
        return Ok(Html(html));
    }

    let page = build_home(state.source(), state.config(), state.ctx(), pages)
        .await
        .map_err(|e| state.upstream(e))?;
    if pages <= 1 {
        state.store().set_home(page.html.clone());
    }
    Ok(Html(page.html))
}

async fn post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ServeError> {
    match fallback::request(&state, &slug) {
        PostSlot::Ready(html) => Ok(Html(html).into_response()),
        PostSlot::Pending => {
            let page = render_post(state.ctx(), &DetailState::Fallback);
            Ok((
                [(header::CACHE_CONTROL, "no-store")],
                Html(page.into_string()),
            )
                .into_response())
        }
        PostSlot::NotFound => Err(state.not_found()),
        PostSlot::Failed(message) => Err(state.resolution_failed(message)),
    }
}

async fn not_found(State(state): State<AppState>) -> ServeError {
    state.not_found()
}

/// Run the server until a shutdown signal arrives. Starts the revalidation
/// timer alongside it.
pub async fn run(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let period = Duration::from_secs(state.config().serve.revalidate_secs);
    let revalidation = revalidate::spawn(state.clone(), period);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        ready_posts = state.store().ready_posts(),
        revalidate_secs = period.as_secs(),
        "server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    revalidation.abort();
    tracing::info!("server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
