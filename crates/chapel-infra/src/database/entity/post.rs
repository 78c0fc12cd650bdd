//! Post entity for SeaORM.

use sea_orm::FromQueryResult;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    pub date: Date,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// List projection: `SELECT id, title, date`.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct SummaryRow {
    pub id: i32,
    pub title: String,
    pub date: Date,
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for chapel_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            image_url: model.image_url,
            date: model.date,
            created_at: model.created_at.into(),
        }
    }
}

impl From<SummaryRow> for chapel_core::domain::PostSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date: row.date,
        }
    }
}
