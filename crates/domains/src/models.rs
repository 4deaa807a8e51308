//! # Domain Models
//!
//! These structs represent the core entities of the blog.
//! We use UUID v7 for time-ordered, globally unique identification.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Coarse permission tag carried by a user and embedded in their token.
///
/// Variants are declared in ascending order of privilege; `Ord` follows
/// that order and `satisfies` relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Read,
    Write,
    Administer,
}

impl Role {
    /// True when a holder of `self` may perform an action gated on `required`.
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Read => "Read",
            Role::Write => "Write",
            Role::Administer => "Administer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Read" => Ok(Role::Read),
            "Write" => Ok(Role::Write),
            "Administer" => Ok(Role::Administer),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

/// An Argon2 PHC string. Only a `PasswordHasher` (or a repository reading an
/// already-hashed value back) should construct one.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: HashedPassword,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh `Read` user. The password must already be hashed.
    pub fn new(username: impl Into<String>, password_hash: HashedPassword) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password_hash,
            role: Role::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Identifier of a post, parsed explicitly from untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// A malformed identifier cannot name an existing post, so it parses
    /// into the same error as a missing one.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(raw)
            .map(PostId)
            .map_err(|_| DomainError::post_not_found())
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A blog post as stored and returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    /// Free text; not linked to any `User`
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn from_draft(draft: PostDraft) -> Self {
        let now = timestamp_now();
        Self {
            id: PostId::new(),
            title: draft.title,
            content: draft.content,
            author: draft.author,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current UTC time truncated to microseconds, the precision stores keep.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The three client-supplied fields of a post.
///
/// Create checks every field for presence; an update replaces all three
/// with whatever the caller sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl PostDraft {
    pub fn new(
        title: Option<String>,
        content: Option<String>,
        author: Option<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            title: required("title", title)?,
            content: required("content", content)?,
            author: required("author", author)?,
        })
    }

    /// Full-replace payload: omitted fields are overwritten with an empty
    /// value instead of keeping the stored one.
    pub fn replacement(
        title: Option<String>,
        content: Option<String>,
        author: Option<String>,
    ) -> Self {
        Self {
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
            author: author.unwrap_or_default(),
        }
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("`{field}` is required"))),
    }
}

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}
