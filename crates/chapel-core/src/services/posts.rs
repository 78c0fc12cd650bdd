use std::sync::Arc;

use chrono::Utc;

use crate::domain::{Post, PostDraft, PostSummary};
use crate::error::DomainError;
use crate::ports::PostRepository;

/// Post operations with input validation in front of the repository.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Summaries of every post, newest date first.
    pub async fn list(&self) -> Result<Vec<PostSummary>, DomainError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: i32) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Create a post. The date defaults to today's UTC date.
    pub async fn create(&self, draft: PostDraft) -> Result<Post, DomainError> {
        let new_post = draft.into_new_post(Utc::now().date_naive())?;
        let post = self.repo.insert(new_post).await?;
        tracing::info!(post_id = post.id, date = %post.date, "Post created");
        Ok(post)
    }

    /// Replace a post. Omitted content and image are cleared, not merged.
    pub async fn update(&self, id: i32, draft: PostDraft) -> Result<Post, DomainError> {
        let replacement = draft.into_replacement()?;
        let post = self
            .repo
            .replace(id, replacement)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;
        tracing::info!(post_id = id, "Post updated");
        Ok(post)
    }

    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::post_not_found(id));
        }
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }
}
