//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the services.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Claims, HashedPassword, Post, PostDraft, PostId, User};

/// Persistence contract for user accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Persists a new user. Must fail with `DomainError::Duplicate` if the
    /// username is already taken, without changing the existing record.
    async fn insert(&self, user: User) -> Result<User>;
}

/// Persistence contract for posts. Listing is in creation order.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn count(&self) -> Result<u64>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Post>>;
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>>;
    async fn insert(&self, post: Post) -> Result<Post>;

    /// Replaces title, content and author. `None` when no such post exists.
    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Option<Post>>;

    /// Returns `false` when no such post exists.
    async fn delete(&self, id: PostId) -> Result<bool>;
}

/// One-way password hashing. Implementations are expected to be slow.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<HashedPassword>;
    async fn verify(&self, plaintext: &str, hash: &HashedPassword) -> Result<bool>;
}

/// Issues and validates bearer tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;

    /// Fails with `DomainError::Unauthenticated` for a bad signature,
    /// malformed token or expired token.
    fn verify(&self, token: &str) -> Result<Claims>;
}
