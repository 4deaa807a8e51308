//! domains/src/lib.rs
//!
//! Entities, value types and port traits for the blog API.
//! Nothing in here performs I/O; adapters implement the ports.

pub mod error;
pub mod models;
pub mod pagination;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use pagination::*;
pub use ports::*;
