//! # PostgreSQL repositories
//!
//! Maps the `users` and `posts` tables onto the domain models. Every
//! operation is a single statement; consistency beyond that is left to
//! the database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    timestamp_now, DomainError, HashedPassword, Post, PostDraft, PostId, PostRepository, Result,
    User, UserRepository,
};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the shared pool used by every repository.
pub async fn connect(url: &str, max_connections: u32) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
}

pub async fn migrate(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

fn store_error(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "database error");
    DomainError::internal(err.to_string())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: HashedPassword::from_phc(row.password_hash),
            role: row
                .role
                .parse()
                .map_err(|_| DomainError::internal(format!("corrupt role for user {}", row.id)))?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    author: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: PostId(row.id),
            title: row.title,
            content: row.content,
            author: row.author,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(User::try_from).transpose()
    }

    async fn insert(&self, user: User) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, role, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            // Lost a race with a concurrent registration of the same name.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DomainError::username_taken())
            }
            Err(err) => Err(store_error(err)),
        }
    }
}

#[derive(Clone)]
pub struct PostgresPostRepo {
    pool: PgPool,
}

impl PostgresPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str = "id, title, content, author, created_at, updated_at";

#[async_trait]
impl PostRepository for PostgresPostRepo {
    async fn count(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(total.max(0) as u64)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Post::from))
    }

    async fn insert(&self, post: Post) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts (id, title, content, author, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.id.0)
        .bind(post.title)
        .bind(post.content)
        .bind(post.author)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Option<Post>> {
        // App clock, same as `created_at`.
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts SET title = $2, content = $3, author = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id.0)
        .bind(draft.title)
        .bind(draft.content)
        .bind(draft.author)
        .bind(timestamp_now())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Post::from))
    }

    async fn delete(&self, id: PostId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: "Test content".to_string(),
            author: "Test Author".to_string(),
        }
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn user_uniqueness_is_enforced(pool: PgPool) {
        let repo = PostgresUserRepo::new(pool);
        repo.insert(User::new("JohnDoe", HashedPassword::from_phc("a")))
            .await
            .unwrap();

        let err = repo
            .insert(User::new("JohnDoe", HashedPassword::from_phc("b")))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::username_taken());

        let stored = repo.find_by_username("JohnDoe").await.unwrap().unwrap();
        assert_eq!(stored.password_hash.as_str(), "a");
    }

    #[sqlx::test(migrator = "MIGRATOR")]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn post_crud_round_trip(pool: PgPool) {
        let repo = PostgresPostRepo::new(pool);
        let post = repo.insert(Post::from_draft(draft("first"))).await.unwrap();

        let fetched = repo.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(fetched, post);
        assert_eq!(repo.count().await.unwrap(), 1);

        let updated = repo.update(post.id, draft("second")).await.unwrap().unwrap();
        assert_eq!(updated.title, "second");
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.updated_at >= updated.created_at);

        assert!(repo.delete(post.id).await.unwrap());
        assert!(repo.find_by_id(post.id).await.unwrap().is_none());
    }
}
