//! # Handlers
//!
//! This module coordinates the flow between HTTP requests and the services.

pub mod auth;
pub mod posts;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GET /
pub async fn index() -> &'static str {
    "Welcome to the Blogging Platform API!"
}
