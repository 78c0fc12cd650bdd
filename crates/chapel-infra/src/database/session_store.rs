//! PostgreSQL session store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, Set};

use chapel_core::domain::{Session, SessionToken};
use chapel_core::ports::{SessionStore, SessionStoreError};

use super::entity::session::{self, Entity as SessionEntity};

/// Sessions persisted in the `sessions` table, so they survive restarts and are shared
/// between server instances.
pub struct PostgresSessionStore {
    db: Arc<DbConn>,
}

impl PostgresSessionStore {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

fn store_err(err: sea_orm::DbErr) -> SessionStoreError {
    match err {
        sea_orm::DbErr::Conn(e) => SessionStoreError::Connection(e.to_string()),
        sea_orm::DbErr::ConnectionAcquire(e) => SessionStoreError::Connection(e.to_string()),
        other => SessionStoreError::Operation(other.to_string()),
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn get(&self, token: &SessionToken) -> Result<Option<Session>, SessionStoreError> {
        let row = SessionEntity::find_by_id(token.as_str().to_owned())
            .filter(session::Column::ExpiresAt.gt(Utc::now()))
            .one(self.db.as_ref())
            .await
            .map_err(store_err)?;

        Ok(row.map(|row| Session {
            token: token.clone(),
            is_admin: row.is_admin,
            expires_at: row.expires_at.into(),
        }))
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        let row = session::ActiveModel {
            id: Set(session.token.as_str().to_owned()),
            is_admin: Set(session.is_admin),
            expires_at: Set(session.expires_at.into()),
        };

        SessionEntity::insert(row)
            .on_conflict(
                OnConflict::column(session::Column::Id)
                    .update_columns([session::Column::IsAdmin, session::Column::ExpiresAt])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(store_err)?;

        Ok(())
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        SessionEntity::delete_by_id(token.as_str().to_owned())
            .exec(self.db.as_ref())
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::ExpiresAt.lte(Utc::now()))
            .exec(self.db.as_ref())
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected)
    }
}
