//! In-memory post repository - used when no database is configured.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use chapel_core::domain::{NewPost, Post, PostSummary};
use chapel_core::error::RepoError;
use chapel_core::ports::PostRepository;

#[derive(Default)]
struct Table {
    rows: Vec<Post>,
    last_id: i32,
}

/// Post repository over a `Vec` behind an async RwLock.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list(&self) -> Result<Vec<PostSummary>, RepoError> {
        let table = self.table.read().await;
        let mut summaries: Vec<PostSummary> =
            table.rows.iter().cloned().map(Into::into).collect();
        summaries.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(summaries)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let post = Post {
            id: table.last_id,
            title: new_post.title,
            content: new_post.content,
            image_url: new_post.image_url,
            date: new_post.date,
            created_at: Utc::now(),
        };
        table.rows.push(post.clone());
        Ok(post)
    }

    async fn replace(&self, id: i32, new_post: NewPost) -> Result<Option<Post>, RepoError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        row.title = new_post.title;
        row.content = new_post.content;
        row.image_url = new_post.image_url;
        row.date = new_post.date;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        let mut table = self.table.write().await;
        let before = table.rows.len();
        table.rows.retain(|p| p.id != id);
        Ok(table.rows.len() < before)
    }
}
