//! # services
//!
//! Use cases of the blog API. Services only see the port traits from
//! `domains`; adapters are injected at startup.

pub mod auth;
pub mod posts;

pub use auth::{AuthService, SignIn};
pub use posts::{PaginationPolicy, PostService};
