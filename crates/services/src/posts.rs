//! Post collection use cases. Role checks happen in the HTTP layer before
//! any of these are reached.

use std::sync::Arc;

use domains::{
    DomainError, PageRequest, Post, PostDraft, PostId, PostPage, PostRepository, Result,
    DEFAULT_LIMIT, DEFAULT_MAX_LIMIT,
};

/// Defaults and bounds applied to `?page=&limit=`.
#[derive(Debug, Clone, Copy)]
pub struct PaginationPolicy {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl PaginationPolicy {
    pub fn page_request(&self, page: Option<&str>, limit: Option<&str>) -> PageRequest {
        PageRequest::from_query(page, limit, self.default_limit, self.max_limit)
    }
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    pagination: PaginationPolicy,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, pagination: PaginationPolicy) -> Self {
        Self { posts, pagination }
    }

    pub fn pagination(&self) -> PaginationPolicy {
        self.pagination
    }

    pub async fn list(&self, request: PageRequest) -> Result<PostPage> {
        let total_posts = self.posts.count().await?;
        let posts = self.posts.list(request.limit(), request.offset()).await?;

        Ok(PostPage {
            total_posts,
            total_pages: request.total_pages(total_posts),
            current_page: request.page(),
            posts,
        })
    }

    pub async fn get(&self, id: PostId) -> Result<Post> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(DomainError::post_not_found)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn create(&self, draft: PostDraft) -> Result<Post> {
        let post = self.posts.insert(Post::from_draft(draft)).await?;
        tracing::info!(post_id = %post.id, "post created");
        Ok(post)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post> {
        let post = self
            .posts
            .update(id, draft)
            .await?
            .ok_or_else(DomainError::post_not_found)?;
        tracing::info!("post updated");
        Ok(post)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: PostId) -> Result<()> {
        if !self.posts.delete(id).await? {
            return Err(DomainError::post_not_found());
        }
        tracing::info!("post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockPostRepository;
    use mockall::predicate::eq;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: "Test content".to_string(),
            author: "Test Author".to_string(),
        }
    }

    fn service(repo: MockPostRepository) -> PostService {
        PostService::new(Arc::new(repo), PaginationPolicy::default())
    }

    #[tokio::test]
    async fn list_uses_offset_and_reports_totals() {
        let mut repo = MockPostRepository::new();
        repo.expect_count().returning(|| Ok(25));
        repo.expect_list()
            .with(eq(10), eq(10))
            .returning(|_, _| Ok((0..10).map(|i| Post::from_draft(draft(&i.to_string()))).collect()));

        let svc = service(repo);
        let page = svc
            .list(svc.pagination().page_request(Some("2"), Some("10")))
            .await
            .unwrap();

        assert_eq!(page.total_posts, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.posts.len(), 10);
    }

    #[tokio::test]
    async fn list_clamps_negative_page() {
        let mut repo = MockPostRepository::new();
        repo.expect_count().returning(|| Ok(0));
        repo.expect_list()
            .with(eq(10), eq(0))
            .returning(|_, _| Ok(Vec::new()));

        let svc = service(repo);
        let page = svc
            .list(svc.pagination().page_request(Some("-4"), None))
            .await
            .unwrap();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let err = service(repo).get(PostId::new()).await.unwrap_err();
        assert_eq!(err, DomainError::post_not_found());
    }

    #[tokio::test]
    async fn create_persists_draft_verbatim() {
        let mut repo = MockPostRepository::new();
        repo.expect_insert()
            .withf(|p| p.title == "Test Post" && p.author == "Test Author")
            .returning(Ok);

        let post = service(repo).create(draft("Test Post")).await.unwrap();
        assert_eq!(post.content, "Test content");
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let mut repo = MockPostRepository::new();
        repo.expect_update().returning(|_, _| Ok(None));
        repo.expect_delete().returning(|_| Ok(false));

        let svc = service(repo);
        let id = PostId::new();
        assert_eq!(
            svc.update(id, draft("x")).await.unwrap_err(),
            DomainError::post_not_found()
        );
        assert_eq!(svc.delete(id).await.unwrap_err(), DomainError::post_not_found());
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let mut repo = MockPostRepository::new();
        repo.expect_count()
            .returning(|| Err(DomainError::internal("connection reset")));

        let err = service(repo).list(PageRequest::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
