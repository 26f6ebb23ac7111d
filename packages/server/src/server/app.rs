//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::auth::{AdminCredentials, SessionStore};
use crate::server::middleware::{require_operator, session_auth_middleware};
use crate::server::routes::{
    export_csv_handler, health_handler, latest_handler, login_handler, logout_handler,
    scrape_handler,
};
use crate::server::static_files::serve_operator_ui;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
    pub sessions: Arc<SessionStore>,
    pub admin: AdminCredentials,
}

impl AppState {
    pub fn new(deps: ServerDeps, sessions: SessionStore, admin: AdminCredentials) -> Self {
        Self {
            deps: Arc::new(deps),
            sessions: Arc::new(sessions),
            admin,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Clone session store for middleware closure
    let sessions_for_middleware = state.sessions.clone();

    // Routes that need a logged-in operator
    let protected = Router::new()
        .route("/api/scrape", post(scrape_handler))
        .route("/api/latest", get(latest_handler))
        .route("/api/export-csv", get(export_csv_handler))
        .route_layer(middleware::from_fn(require_operator));

    Router::new()
        .merge(protected)
        .route("/api/login", post(login_handler))
        .route("/api/logout", post(logout_handler))
        // Health check (no session)
        .route("/health", get(health_handler))
        .fallback(serve_operator_ui)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req: Request, next: Next| {
            session_auth_middleware(sessions_for_middleware.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
