//! Durable, owner-partitioned storage for cached entities.
//!
//! Entities are stored as JSON in a `data` column beside indexed
//! id/owner/entity_date/sync_status columns. The sync status never appears
//! in what callers read back; it belongs to the store, not the entity.

use sqlx::SqlitePool;
use std::fmt;

use super::StoreError;
use crate::models::{LocalEntity, RecordId};

/// Whether a cached record has been confirmed by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Pending,
    Synced,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Pending => write!(f, "pending"),
            SyncState::Synced => write!(f, "synced"),
        }
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    data: String,
}

/// The local persistent store: cached copies of remote entities plus the
/// sync queue (see `queue_repo`). Cheap to clone; wraps the pool.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts or overwrites a record by id.
    pub async fn put<E: LocalEntity>(
        &self,
        record: &E,
        state: SyncState,
    ) -> Result<(), StoreError> {
        if record.owner().is_empty() {
            return Err(StoreError::InvalidRecord("owner must be set".into()));
        }

        let data = serde_json::to_string(record)?;
        let sql = format!(
            r#"
            INSERT INTO {} (id, owner, entity_date, sync_status, data)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                owner = excluded.owner,
                entity_date = excluded.entity_date,
                sync_status = excluded.sync_status,
                data = excluded.data
            "#,
            E::KIND.table()
        );

        sqlx::query(&sql)
            .bind(record.id().to_string())
            .bind(record.owner())
            .bind(record.entity_date().to_string())
            .bind(state.to_string())
            .bind(&data)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// All of one owner's records, newest entity date first.
    pub async fn get_all_for_owner<E: LocalEntity>(
        &self,
        owner: &str,
    ) -> Result<Vec<E>, StoreError> {
        let sql = format!(
            "SELECT data FROM {} WHERE owner = ? ORDER BY entity_date DESC",
            E::KIND.table()
        );
        let rows: Vec<RecordRow> = sqlx::query_as(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(serde_json::from_str(&row.data)?);
        }
        Ok(records)
    }

    pub async fn get_by_id<E: LocalEntity>(
        &self,
        owner: &str,
        id: &RecordId,
    ) -> Result<Option<E>, StoreError> {
        let sql = format!(
            "SELECT data FROM {} WHERE id = ? AND owner = ?",
            E::KIND.table()
        );
        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.data)?)),
            None => Ok(None),
        }
    }

    /// Removes a record. An absent id is success; an id owned by someone
    /// else fails with `NotFound` (ownership is checked before deletion).
    pub async fn delete<E: LocalEntity>(
        &self,
        owner: &str,
        id: &RecordId,
    ) -> Result<(), StoreError> {
        let sql = format!("SELECT owner FROM {} WHERE id = ?", E::KIND.table());
        let existing: Option<(String,)> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match existing {
            None => Ok(()),
            Some((record_owner,)) if record_owner != owner => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Some(_) => {
                let sql = format!("DELETE FROM {} WHERE id = ?", E::KIND.table());
                sqlx::query(&sql)
                    .bind(id.to_string())
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }
        }
    }

    /// Flips a record's sync status to `synced` after a confirmed replay.
    pub async fn mark_synced<E: LocalEntity>(&self, id: &RecordId) -> Result<(), StoreError> {
        let sql = format!(
            "UPDATE {} SET sync_status = 'synced' WHERE id = ?",
            E::KIND.table()
        );
        sqlx::query(&sql)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Number of an owner's records still awaiting remote confirmation.
    pub async fn pending_count<E: LocalEntity>(&self, owner: &str) -> Result<usize, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE owner = ? AND sync_status = 'pending'",
            E::KIND.table()
        );
        let count: (i64,) = sqlx::query_as(&sql)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 as usize)
    }
}
