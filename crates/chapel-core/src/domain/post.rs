use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Column limit on `posts.title`.
pub const TITLE_MAX_CHARS: usize = 255;

/// Post entity - a published article on the information board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// List projection of a post. Body and image are left out to keep listings light.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i32,
    pub title: String,
    pub date: NaiveDate,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            date: post.date,
        }
    }
}

/// Unvalidated post fields as submitted by a client.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: Option<String>,
}

/// A validated post ready to be written. Used for both insert and full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub date: NaiveDate,
}

impl PostDraft {
    /// Validate for insertion. A missing date falls back to `today`.
    pub fn into_new_post(self, today: NaiveDate) -> Result<NewPost, DomainError> {
        let title = validate_title(self.title)?;
        let date = match parse_date(self.date)? {
            Some(date) => date,
            None => today,
        };

        Ok(NewPost {
            title,
            content: non_empty(self.content),
            image_url: non_empty(self.image_url),
            date,
        })
    }

    /// Validate for a full replace. The date must be supplied.
    pub fn into_replacement(self) -> Result<NewPost, DomainError> {
        let title = validate_title(self.title)?;
        let date =
            parse_date(self.date)?.ok_or_else(|| DomainError::validation("Date is required"))?;

        Ok(NewPost {
            title,
            content: non_empty(self.content),
            image_url: non_empty(self.image_url),
            date,
        })
    }
}

fn validate_title(title: Option<String>) -> Result<String, DomainError> {
    let title = title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err(DomainError::validation("Title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title)
}

fn parse_date(date: Option<String>) -> Result<Option<NaiveDate>, DomainError> {
    match non_empty(date) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DomainError::validation("Date must be formatted as YYYY-MM-DD")),
    }
}

/// Empty strings are stored as null.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
