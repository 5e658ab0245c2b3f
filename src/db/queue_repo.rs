//! Sync queue sub-operations of the local store.
//!
//! The queue is a flat durable list; no ordering is applied here. The sync
//! manager sorts by `enqueued_at` at read time, so ordering logic can change
//! without a storage migration.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::local_store::LocalStore;
use super::StoreError;
use crate::sync::{QueueItem, QueuePayload};

#[derive(sqlx::FromRow)]
struct QueueRow {
    id: String,
    owner: String,
    operation: String,
    entity_kind: String,
    target_id: String,
    payload: Option<String>,
    enqueued_at: String,
    retry_count: i64,
    max_retries: i64,
    last_error: Option<String>,
}

impl QueueRow {
    fn into_item(self) -> Result<QueueItem, StoreError> {
        let payload: Option<QueuePayload> = match self.payload {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };

        Ok(QueueItem {
            id: Uuid::parse_str(&self.id)
                .map_err(|e| StoreError::InvalidRecord(format!("queue item id: {}", e)))?,
            owner: self.owner,
            operation: self
                .operation
                .parse()
                .map_err(StoreError::InvalidRecord)?,
            entity_kind: self
                .entity_kind
                .parse()
                .map_err(StoreError::InvalidRecord)?,
            target: self
                .target_id
                .parse()
                .map_err(|e| StoreError::InvalidRecord(format!("queue target id: {}", e)))?,
            payload,
            enqueued_at: DateTime::parse_from_rfc3339(&self.enqueued_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StoreError::InvalidRecord(format!("queue timestamp: {}", e)))?,
            retry_count: self.retry_count as u32,
            max_retries: self.max_retries as u32,
            last_error: self.last_error,
        })
    }
}

impl LocalStore {
    /// Appends a pending operation to the durable queue.
    pub async fn enqueue(&self, item: &QueueItem) -> Result<(), StoreError> {
        let payload = match &item.payload {
            Some(payload) => Some(serde_json::to_string(payload)?),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO sync_queue
                (id, owner, operation, entity_kind, target_id, payload,
                 enqueued_at, retry_count, max_retries, last_error)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(&item.owner)
        .bind(item.operation.to_string())
        .bind(item.entity_kind.to_string())
        .bind(item.target.to_string())
        .bind(&payload)
        .bind(item.enqueued_at.to_rfc3339())
        .bind(item.retry_count as i64)
        .bind(item.max_retries as i64)
        .bind(&item.last_error)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// All of one owner's queued items, in storage order (unsorted).
    pub async fn queue_for_owner(&self, owner: &str) -> Result<Vec<QueueItem>, StoreError> {
        let rows: Vec<QueueRow> = sqlx::query_as("SELECT * FROM sync_queue WHERE owner = ?")
            .bind(owner)
            .fetch_all(self.pool())
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(row.into_item()?);
        }
        Ok(items)
    }

    pub async fn remove_queue_item(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sync_queue WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }

    /// Persists the retry bookkeeping of a failed item back onto the queue.
    pub async fn update_queue_retry(
        &self,
        id: Uuid,
        retry_count: u32,
        last_error: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE sync_queue SET retry_count = ?, last_error = ? WHERE id = ?")
            .bind(retry_count as i64)
            .bind(last_error)
            .bind(id.to_string())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}
