//! # api-adapters
//!
//! The HTTP routing and orchestration layer for the blog API.

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
mod routes;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use routes::router;

#[cfg(feature = "web-axum")]
use std::sync::Arc;

/// State shared by every handler. Cloning is cheap: everything is behind `Arc`.
#[cfg(feature = "web-axum")]
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<services::AuthService>,
    pub posts: Arc<services::PostService>,
    pub tokens: Arc<dyn domains::TokenService>,
}
