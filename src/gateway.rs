//! Mutation gateway: the connectivity-agnostic write surface.
//!
//! Each operation decides once, at call time, whether to write through to
//! the remote store or to cache locally and enqueue a pending mutation.
//! Offline creates return the freshly generated local id immediately so
//! callers can render optimistically.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::connectivity::ConnectivityMonitor;
use crate::db::{LocalStore, StoreError, SyncState};
use crate::models::{EntityKind, Goal, Meal, RecordId, WeightLog, Workout};
use crate::remote::{
    GoalPayload, MealPayload, RemoteError, RemoteStore, WeightLogPayload, WorkoutPayload,
};
use crate::sync::{QueueItem, QueuePayload};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("local store error: {0}")]
    Store(#[from] StoreError),

    #[error("remote store error: {0}")]
    Remote(#[from] RemoteError),
}

pub struct MutationGateway<R> {
    store: LocalStore,
    remote: R,
    monitor: Arc<ConnectivityMonitor>,
}

impl<R: RemoteStore> MutationGateway<R> {
    pub fn new(store: LocalStore, remote: R, monitor: Arc<ConnectivityMonitor>) -> Self {
        Self {
            store,
            remote,
            monitor,
        }
    }

    // ========== Workouts ==========

    pub async fn add_workout(&self, mut workout: Workout) -> Result<RecordId, GatewayError> {
        let payload = WorkoutPayload::from(&workout);
        if self.monitor.is_online() {
            let remote_id = self.remote.create_workout(&workout.owner, &payload).await?;
            workout.id = RecordId::remote(remote_id);
            self.store.put(&workout, SyncState::Synced).await?;
        } else {
            self.store.put(&workout, SyncState::Pending).await?;
            self.store
                .enqueue(&QueueItem::create(
                    workout.owner.clone(),
                    workout.id.clone(),
                    QueuePayload::Workout(payload),
                ))
                .await?;
        }
        Ok(workout.id)
    }

    pub async fn update_workout(&self, mut workout: Workout) -> Result<(), GatewayError> {
        workout.updated_at = Utc::now();
        let payload = WorkoutPayload::from(&workout);
        if self.monitor.is_online() {
            if let Some(remote_id) = workout.id.as_remote() {
                self.remote
                    .update_workout(&workout.owner, remote_id, &payload)
                    .await?;
                self.store.put(&workout, SyncState::Synced).await?;
                return Ok(());
            }
            // The record was created offline and has no remote counterpart
            // yet; fall through to the queued path.
        }
        self.store.put(&workout, SyncState::Pending).await?;
        self.store
            .enqueue(&QueueItem::update(
                workout.owner.clone(),
                workout.id.clone(),
                QueuePayload::Workout(payload),
            ))
            .await?;
        Ok(())
    }

    pub async fn delete_workout(&self, owner: &str, id: &RecordId) -> Result<(), GatewayError> {
        self.delete_record::<Workout>(owner, id, EntityKind::Workout)
            .await
    }

    // ========== Meals ==========

    pub async fn add_meal(&self, mut meal: Meal) -> Result<RecordId, GatewayError> {
        let payload = MealPayload::from(&meal);
        if self.monitor.is_online() {
            let remote_id = self.remote.create_meal(&meal.owner, &payload).await?;
            meal.id = RecordId::remote(remote_id);
            self.store.put(&meal, SyncState::Synced).await?;
        } else {
            self.store.put(&meal, SyncState::Pending).await?;
            self.store
                .enqueue(&QueueItem::create(
                    meal.owner.clone(),
                    meal.id.clone(),
                    QueuePayload::Meal(payload),
                ))
                .await?;
        }
        Ok(meal.id)
    }

    pub async fn update_meal(&self, mut meal: Meal) -> Result<(), GatewayError> {
        meal.updated_at = Utc::now();
        let payload = MealPayload::from(&meal);
        if self.monitor.is_online() {
            if let Some(remote_id) = meal.id.as_remote() {
                self.remote
                    .update_meal(&meal.owner, remote_id, &payload)
                    .await?;
                self.store.put(&meal, SyncState::Synced).await?;
                return Ok(());
            }
        }
        self.store.put(&meal, SyncState::Pending).await?;
        self.store
            .enqueue(&QueueItem::update(
                meal.owner.clone(),
                meal.id.clone(),
                QueuePayload::Meal(payload),
            ))
            .await?;
        Ok(())
    }

    pub async fn delete_meal(&self, owner: &str, id: &RecordId) -> Result<(), GatewayError> {
        self.delete_record::<Meal>(owner, id, EntityKind::Meal).await
    }

    // ========== Goals ==========
    //
    // Capturing goal mutations works like every other kind; it is the
    // replay path that is still missing (see the sync manager).

    pub async fn add_goal(&self, mut goal: Goal) -> Result<RecordId, GatewayError> {
        let payload = GoalPayload::from(&goal);
        if self.monitor.is_online() {
            let remote_id = self.remote.create_goal(&goal.owner, &payload).await?;
            goal.id = RecordId::remote(remote_id);
            self.store.put(&goal, SyncState::Synced).await?;
        } else {
            self.store.put(&goal, SyncState::Pending).await?;
            self.store
                .enqueue(&QueueItem::create(
                    goal.owner.clone(),
                    goal.id.clone(),
                    QueuePayload::Goal(payload),
                ))
                .await?;
        }
        Ok(goal.id)
    }

    pub async fn update_goal(&self, mut goal: Goal) -> Result<(), GatewayError> {
        goal.updated_at = Utc::now();
        let payload = GoalPayload::from(&goal);
        if self.monitor.is_online() {
            if let Some(remote_id) = goal.id.as_remote() {
                self.remote
                    .update_goal(&goal.owner, remote_id, &payload)
                    .await?;
                self.store.put(&goal, SyncState::Synced).await?;
                return Ok(());
            }
        }
        self.store.put(&goal, SyncState::Pending).await?;
        self.store
            .enqueue(&QueueItem::update(
                goal.owner.clone(),
                goal.id.clone(),
                QueuePayload::Goal(payload),
            ))
            .await?;
        Ok(())
    }

    pub async fn delete_goal(&self, owner: &str, id: &RecordId) -> Result<(), GatewayError> {
        self.delete_record::<Goal>(owner, id, EntityKind::Goal).await
    }

    // ========== Weight logs ==========

    pub async fn add_weight_log(&self, mut log: WeightLog) -> Result<RecordId, GatewayError> {
        let payload = WeightLogPayload::from(&log);
        if self.monitor.is_online() {
            let remote_id = self.remote.create_weight_log(&log.owner, &payload).await?;
            log.id = RecordId::remote(remote_id);
            self.store.put(&log, SyncState::Synced).await?;
        } else {
            self.store.put(&log, SyncState::Pending).await?;
            self.store
                .enqueue(&QueueItem::create(
                    log.owner.clone(),
                    log.id.clone(),
                    QueuePayload::WeightLog(payload),
                ))
                .await?;
        }
        Ok(log.id)
    }

    pub async fn update_weight_log(&self, mut log: WeightLog) -> Result<(), GatewayError> {
        log.updated_at = Utc::now();
        let payload = WeightLogPayload::from(&log);
        if self.monitor.is_online() {
            if let Some(remote_id) = log.id.as_remote() {
                self.remote
                    .update_weight_log(&log.owner, remote_id, &payload)
                    .await?;
                self.store.put(&log, SyncState::Synced).await?;
                return Ok(());
            }
        }
        self.store.put(&log, SyncState::Pending).await?;
        self.store
            .enqueue(&QueueItem::update(
                log.owner.clone(),
                log.id.clone(),
                QueuePayload::WeightLog(payload),
            ))
            .await?;
        Ok(())
    }

    pub async fn delete_weight_log(&self, owner: &str, id: &RecordId) -> Result<(), GatewayError> {
        self.delete_record::<WeightLog>(owner, id, EntityKind::WeightLog)
            .await
    }

    /// Shared delete path. Online deletes of confirmed records go straight
    /// to the remote store; everything else removes the cached record and
    /// queues the delete. Ownership is enforced by the local store before
    /// any row disappears.
    async fn delete_record<E: crate::models::LocalEntity>(
        &self,
        owner: &str,
        id: &RecordId,
        kind: EntityKind,
    ) -> Result<(), GatewayError> {
        if self.monitor.is_online() {
            if let Some(remote_id) = id.as_remote() {
                self.remote_delete(owner, kind, remote_id).await?;
                self.store.delete::<E>(owner, id).await?;
                return Ok(());
            }
        }
        self.store.delete::<E>(owner, id).await?;
        self.store
            .enqueue(&QueueItem::delete(owner, kind, id.clone()))
            .await?;
        Ok(())
    }

    async fn remote_delete(
        &self,
        owner: &str,
        kind: EntityKind,
        remote_id: &str,
    ) -> Result<(), RemoteError> {
        match kind {
            EntityKind::Workout => self.remote.delete_workout(owner, remote_id).await,
            EntityKind::Meal => self.remote.delete_meal(owner, remote_id).await,
            EntityKind::Goal => self.remote.delete_goal(owner, remote_id).await,
            EntityKind::WeightLog => self.remote.delete_weight_log(owner, remote_id).await,
        }
    }
}
