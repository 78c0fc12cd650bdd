use async_trait::async_trait;

use crate::domain::{NewPost, Post, PostSummary};
use crate::error::RepoError;

/// Storage for posts. Inputs are already validated by
/// [`PostService`](crate::services::PostService).
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts ordered by `date DESC, id DESC`.
    async fn list(&self) -> Result<Vec<PostSummary>, RepoError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError>;

    /// Insert a post; the store assigns `id` and `created_at`.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace title, content, image and date. `Ok(None)` when the id is unknown.
    async fn replace(&self, id: i32, post: NewPost) -> Result<Option<Post>, RepoError>;

    /// Physically delete a post. `Ok(false)` when the id is unknown.
    async fn delete(&self, id: i32) -> Result<bool, RepoError>;
}
