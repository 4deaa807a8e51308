//! # storage-adapters
//!
//! Implementations of the `UserRepository` and `PostRepository` ports.
//! The in-memory store is always compiled; PostgreSQL sits behind the
//! `db-postgres` feature.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::{InMemoryPostRepo, InMemoryUserRepo};
#[cfg(feature = "db-postgres")]
pub use postgres::{PostgresPostRepo, PostgresUserRepo};
