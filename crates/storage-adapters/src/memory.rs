//! DashMap-backed repositories for tests and local experiments.
//! Data lives only as long as the process.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    timestamp_now, DomainError, Post, PostDraft, PostId, PostRepository, Result, User,
    UserRepository,
};

/// Users keyed by username, which makes uniqueness a single entry check.
#[derive(Default)]
pub struct InMemoryUserRepo {
    users: DashMap<String, User>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepo {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }

    async fn insert(&self, user: User) -> Result<User> {
        match self.users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(DomainError::username_taken()),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }
}

struct StoredPost {
    /// Insertion sequence, used for creation-order listing
    seq: u64,
    post: Post,
}

#[derive(Default)]
pub struct InMemoryPostRepo {
    posts: DashMap<PostId, StoredPost>,
    next_seq: AtomicU64,
}

impl InMemoryPostRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepo {
    async fn count(&self) -> Result<u64> {
        Ok(self.posts.len() as u64)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Post>> {
        let mut all: Vec<(u64, Post)> = self
            .posts
            .iter()
            .map(|entry| (entry.seq, entry.post.clone()))
            .collect();
        all.sort_by_key(|(seq, _)| *seq);

        Ok(all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(_, post)| post)
            .collect())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|entry| entry.post.clone()))
    }

    async fn insert(&self, post: Post) -> Result<Post> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.posts.insert(
            post.id,
            StoredPost {
                seq,
                post: post.clone(),
            },
        );
        Ok(post)
    }

    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Option<Post>> {
        Ok(self.posts.get_mut(&id).map(|mut entry| {
            let post = &mut entry.post;
            post.title = draft.title;
            post.content = draft.content;
            post.author = draft.author;
            post.updated_at = timestamp_now();
            post.clone()
        }))
    }

    async fn delete(&self, id: PostId) -> Result<bool> {
        Ok(self.posts.remove(&id).is_some())
    }
}
