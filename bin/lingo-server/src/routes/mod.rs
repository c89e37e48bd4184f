//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - `/health` server heartbeat
//! - `/api` chat routes and `/api/translation` translation routes, behind the
//!   session middleware
//! - `/api-docs/openapi.json` when `LINGO_ENABLE_DOCS` is on
//! - trace and CORS layers around everything

mod chat;
pub mod doc;
mod health;
mod translation;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router, middleware};
use tower::ServiceBuilder;

use crate::error::ServerError;
use crate::middleware::{cors, session, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(chat::router())
        .nest("/translation", translation::router())
        .layer(middleware::from_fn(session::session_middleware));

    let mut app = Router::new()
        .merge(health::router())
        .nest("/api", api_router);

    if state.config.enable_docs {
        app = app.route(
            "/api-docs/openapi.json",
            get(|| async { Json(doc::get_docs()) }),
        );
    }

    app.fallback(not_found)
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(cors::cors_layer(&state.config))
                .layer(middleware::from_fn(trace::trace_middleware)),
        )
        .with_state(state)
}

async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(format!("no route for {}", uri.path()))
}
