//! Route table for the action API.
//!
//! | Method | Path           | Handler                                  |
//! |--------|----------------|------------------------------------------|
//! | GET    | `/action/{id}` | [`create_stub_action`]                   |
//! | DELETE | `/action/{id}` | [`acknowledge_removal`]                  |
//!
//! Anything else gets axum's default `404 Not Found` or
//! `405 Method Not Allowed`, with no custom body.

use crate::handlers::{acknowledge_removal, create_stub_action};
use crate::middleware::log_request;
use crate::runtime_config::ServerConfig;
use axum::routing::get;
use axum::Router;
use http::StatusCode;
use tower_http::timeout::TimeoutLayer;

/// Path shared by both action routes.
pub const ACTION_PATH: &str = "/action/{id}";

/// Build the application router with its middleware stack.
pub fn build_router(config: &ServerConfig) -> Router {
    with_middleware(action_routes(), config)
}

/// The bare action routes, without timeout or logging.
pub fn action_routes() -> Router {
    Router::new().route(ACTION_PATH, get(create_stub_action).delete(acknowledge_removal))
}

/// Wrap `routes` in the write timeout and the access logger.
///
/// The write timeout bounds handler execution (408 when hit). The access
/// logger sits outermost so unmatched requests are logged too.
pub fn with_middleware(routes: Router, config: &ServerConfig) -> Router {
    routes
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.write_timeout,
        ))
        .layer(axum::middleware::from_fn(log_request))
}
