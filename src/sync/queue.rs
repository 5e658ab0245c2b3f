//! Sync queue item model.
//!
//! A queue item is one pending mutation awaiting replay against the remote
//! store. Payloads are a closed set of per-entity variants, so the sync
//! manager's dispatch is a total match rather than a string-keyed branch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{EntityKind, RecordId};
use crate::remote::{GoalPayload, MealPayload, WeightLogPayload, WorkoutPayload};

/// Retry budget per queue item across drain passes.
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueOperation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for QueueOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueOperation::Create => write!(f, "create"),
            QueueOperation::Update => write!(f, "update"),
            QueueOperation::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for QueueOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(QueueOperation::Create),
            "update" => Ok(QueueOperation::Update),
            "delete" => Ok(QueueOperation::Delete),
            _ => Err(format!("Invalid queue operation '{}'", s)),
        }
    }
}

/// Remote-facing payload of a create/update item, one variant per entity
/// kind. Delete items carry no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuePayload {
    Workout(WorkoutPayload),
    Meal(MealPayload),
    Goal(GoalPayload),
    WeightLog(WeightLogPayload),
}

impl QueuePayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            QueuePayload::Workout(_) => EntityKind::Workout,
            QueuePayload::Meal(_) => EntityKind::Meal,
            QueuePayload::Goal(_) => EntityKind::Goal,
            QueuePayload::WeightLog(_) => EntityKind::WeightLog,
        }
    }
}

/// One pending mutation in the durable sync queue.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: Uuid,
    pub owner: String,
    pub operation: QueueOperation,
    pub entity_kind: EntityKind,
    pub target: RecordId,
    pub payload: Option<QueuePayload>,
    pub enqueued_at: DateTime<Utc>,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
}

impl QueueItem {
    fn new(
        owner: impl Into<String>,
        operation: QueueOperation,
        entity_kind: EntityKind,
        target: RecordId,
        payload: Option<QueuePayload>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            operation,
            entity_kind,
            target,
            payload,
            enqueued_at: Utc::now(),
            retry_count: 0,
            max_retries: MAX_RETRIES,
            last_error: None,
        }
    }

    pub fn create(owner: impl Into<String>, target: RecordId, payload: QueuePayload) -> Self {
        let kind = payload.kind();
        Self::new(owner, QueueOperation::Create, kind, target, Some(payload))
    }

    pub fn update(owner: impl Into<String>, target: RecordId, payload: QueuePayload) -> Self {
        let kind = payload.kind();
        Self::new(owner, QueueOperation::Update, kind, target, Some(payload))
    }

    pub fn delete(owner: impl Into<String>, kind: EntityKind, target: RecordId) -> Self {
        Self::new(owner, QueueOperation::Delete, kind, target, None)
    }
}
