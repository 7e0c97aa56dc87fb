//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::borrowing::engine::LifecycleEngine;
use crate::kernel::{spawn_dispatcher, ServerDeps, TransitionOutbox};
use crate::server::middleware::bearer_identity_middleware;
use crate::server::routes::{borrow_requests, health, notifications, tools, users};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    pub engine: Arc<LifecycleEngine>,
}

/// Build the application router over a dependency set.
///
/// Also wires the transition outbox and spawns its dispatcher task, so
/// committed transitions fan out to notifications regardless of which
/// dependency set (Postgres or in-memory) is behind `deps`.
pub fn build_app(deps: Arc<ServerDeps>) -> Router {
    let (outbox, rx) = TransitionOutbox::channel();
    spawn_dispatcher(rx, deps.clone());

    let engine = Arc::new(LifecycleEngine::new(deps.requests.clone(), outbox));
    let state = AxumAppState { deps, engine };

    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/users", post(users::register_user))
        .route("/api/users/me", get(users::current_user))
        .route("/api/users/:id", get(users::get_user))
        // Tool catalog
        .route("/api/tools", post(tools::create_tool).get(tools::list_tools))
        .route("/api/tools/my-tools", get(tools::my_tools))
        .route("/api/tools/:id", get(tools::get_tool).put(tools::update_tool))
        // Borrow lifecycle
        .route(
            "/api/borrow-requests",
            post(borrow_requests::create_borrow_request),
        )
        .route(
            "/api/borrow-requests/my-requests",
            get(borrow_requests::my_requests),
        )
        .route(
            "/api/borrow-requests/for-my-tools",
            get(borrow_requests::for_my_tools),
        )
        .route(
            "/api/borrow-requests/:id/accept",
            put(borrow_requests::accept_request),
        )
        .route(
            "/api/borrow-requests/:id/reject",
            put(borrow_requests::reject_request),
        )
        .route(
            "/api/borrow-requests/:id/collected",
            put(borrow_requests::confirm_collected),
        )
        .route(
            "/api/borrow-requests/:id/returned",
            put(borrow_requests::confirm_returned),
        )
        .route(
            "/api/borrow-requests/:id/confirm-receipt",
            put(borrow_requests::confirm_receipt),
        )
        .route(
            "/api/borrow-requests/:id/cancel",
            put(borrow_requests::cancel_request),
        )
        .route(
            "/api/borrow-requests/:id/timeline",
            get(borrow_requests::status_timeline),
        )
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/unread",
            get(notifications::unread_notifications),
        )
        .route(
            "/api/notifications/read-all",
            put(notifications::mark_all_read),
        )
        .route("/api/notifications/:id/read", put(notifications::mark_read))
        .layer(middleware::from_fn(bearer_identity_middleware))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
