//! Queue drain engine.
//!
//! Replays one owner's pending mutations against the remote store, oldest
//! first, with bounded per-item retry. Exactly one drain runs at a time per
//! manager instance; the guard is process-local and does not stop another
//! process or device from draining the same owner concurrently.

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{LocalStore, StoreError, SyncState};
use crate::models::{EntityKind, LocalEntity, Meal, RecordId, WeightLog, Workout};
use crate::remote::{RemoteError, RemoteStore};
use crate::sync::queue::{QueueItem, QueueOperation, QueuePayload};

/// Summary of one drain pass. Ephemeral; never persisted.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub attempted: usize,
    pub synced: usize,
    /// Items that errored on this pass, whether left for retry or abandoned.
    pub failed: usize,
    pub errors: Vec<SyncItemError>,
}

#[derive(Debug, Clone)]
pub struct SyncItemError {
    pub id: Uuid,
    pub error: String,
}

/// Read-only summary derived from the queue's current contents.
#[derive(Debug, Clone, Default)]
pub struct SyncStatus {
    pub pending: usize,
    /// Still-queued items that have errored at least once.
    pub failed: usize,
    pub last_error: Option<String>,
}

#[derive(Error, Debug)]
enum ReplayError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum ReplayOutcome {
    Applied,
    /// Nothing meaningful to replay; drop the item without counting it.
    Skipped(&'static str),
    /// No replay path exists for this kind yet; leave the item queued.
    Unsupported,
}

pub struct SyncManager<R> {
    store: LocalStore,
    remote: R,
    /// Drain mutual exclusion. Owned by the instance so independent
    /// managers (and their tests) share no hidden state.
    drain_lock: Mutex<()>,
}

impl<R: RemoteStore> SyncManager<R> {
    pub fn new(store: LocalStore, remote: R) -> Self {
        Self {
            store,
            remote,
            drain_lock: Mutex::new(()),
        }
    }

    /// Drains the owner's queue against the remote store.
    ///
    /// If a drain is already running in this process the call returns an
    /// all-zero report immediately rather than running concurrently. One
    /// item's remote failure never aborts the rest of the pass; store
    /// failures do, since nothing can be recorded without the store.
    ///
    /// A replayed create whose previous attempt succeeded remotely but was
    /// never acknowledged can duplicate the entity on the server; the
    /// remote API offers no idempotency key, so this is not deduplicated
    /// here.
    pub async fn process_sync_queue(&self, owner: &str) -> Result<SyncReport, StoreError> {
        let Ok(_guard) = self.drain_lock.try_lock() else {
            tracing::debug!(owner, "drain already running, skipping");
            return Ok(SyncReport::default());
        };

        let mut items = self.store.queue_for_owner(owner).await?;
        // Oldest first: preserves the causal order of the user's actions.
        items.sort_by_key(|item| item.enqueued_at);

        let mut report = SyncReport {
            attempted: items.len(),
            ..SyncReport::default()
        };

        for item in items {
            match self.replay(&item).await {
                Ok(ReplayOutcome::Applied) => {
                    self.store.remove_queue_item(item.id).await?;
                    report.synced += 1;
                    tracing::debug!(
                        item = %item.id,
                        kind = %item.entity_kind,
                        op = %item.operation,
                        "replayed"
                    );
                }
                Ok(ReplayOutcome::Skipped(reason)) => {
                    self.store.remove_queue_item(item.id).await?;
                    tracing::warn!(item = %item.id, reason, "skipped queue item");
                }
                Ok(ReplayOutcome::Unsupported) => {
                    tracing::warn!(
                        item = %item.id,
                        kind = %item.entity_kind,
                        "no replay path for this kind yet, leaving queued"
                    );
                }
                Err(ReplayError::Remote(e)) => {
                    let retries = item.retry_count + 1;
                    let message = e.to_string();
                    if retries >= item.max_retries {
                        tracing::error!(
                            item = %item.id,
                            error = %message,
                            "retry budget exhausted, abandoning item"
                        );
                        self.store.remove_queue_item(item.id).await?;
                    } else {
                        tracing::warn!(
                            item = %item.id,
                            retries,
                            error = %message,
                            "replay failed, will retry on next drain"
                        );
                        self.store
                            .update_queue_retry(item.id, retries, &message)
                            .await?;
                    }
                    report.failed += 1;
                    report.errors.push(SyncItemError {
                        id: item.id,
                        error: message,
                    });
                }
                Err(ReplayError::Store(e)) => return Err(e),
            }
        }

        tracing::info!(
            owner,
            attempted = report.attempted,
            synced = report.synced,
            failed = report.failed,
            "drain finished"
        );
        Ok(report)
    }

    /// Summarizes the queue without touching the remote store.
    pub async fn sync_status(&self, owner: &str) -> Result<SyncStatus, StoreError> {
        let items = self.store.queue_for_owner(owner).await?;
        let last_error = items
            .iter()
            .filter(|item| item.last_error.is_some())
            .max_by_key(|item| item.enqueued_at)
            .and_then(|item| item.last_error.clone());

        Ok(SyncStatus {
            pending: items.len(),
            failed: items.iter().filter(|item| item.retry_count > 0).count(),
            last_error,
        })
    }

    async fn replay(&self, item: &QueueItem) -> Result<ReplayOutcome, ReplayError> {
        match item.operation {
            QueueOperation::Create => self.replay_create(item).await,
            QueueOperation::Update => self.replay_update(item).await,
            QueueOperation::Delete => self.replay_delete(item).await,
        }
    }

    async fn replay_create(&self, item: &QueueItem) -> Result<ReplayOutcome, ReplayError> {
        let Some(payload) = &item.payload else {
            return Ok(ReplayOutcome::Skipped("create item carries no payload"));
        };

        match payload {
            QueuePayload::Workout(payload) => {
                let remote_id = self.remote.create_workout(&item.owner, payload).await?;
                self.confirm_create::<Workout>(&item.owner, &item.target, remote_id)
                    .await?;
            }
            QueuePayload::Meal(payload) => {
                let remote_id = self.remote.create_meal(&item.owner, payload).await?;
                self.confirm_create::<Meal>(&item.owner, &item.target, remote_id)
                    .await?;
            }
            QueuePayload::WeightLog(payload) => {
                let remote_id = self.remote.create_weight_log(&item.owner, payload).await?;
                self.confirm_create::<WeightLog>(&item.owner, &item.target, remote_id)
                    .await?;
            }
            QueuePayload::Goal(_) => return Ok(ReplayOutcome::Unsupported),
        }
        Ok(ReplayOutcome::Applied)
    }

    async fn replay_update(&self, item: &QueueItem) -> Result<ReplayOutcome, ReplayError> {
        let Some(remote_id) = item.target.as_remote() else {
            return Ok(ReplayOutcome::Skipped(
                "update target was never confirmed by the remote store",
            ));
        };
        let Some(payload) = &item.payload else {
            return Ok(ReplayOutcome::Skipped("update item carries no payload"));
        };

        match payload {
            QueuePayload::Workout(payload) => {
                self.remote
                    .update_workout(&item.owner, remote_id, payload)
                    .await?;
                self.store.mark_synced::<Workout>(&item.target).await?;
            }
            QueuePayload::Meal(payload) => {
                self.remote
                    .update_meal(&item.owner, remote_id, payload)
                    .await?;
                self.store.mark_synced::<Meal>(&item.target).await?;
            }
            QueuePayload::WeightLog(payload) => {
                self.remote
                    .update_weight_log(&item.owner, remote_id, payload)
                    .await?;
                self.store.mark_synced::<WeightLog>(&item.target).await?;
            }
            QueuePayload::Goal(_) => return Ok(ReplayOutcome::Unsupported),
        }
        Ok(ReplayOutcome::Applied)
    }

    async fn replay_delete(&self, item: &QueueItem) -> Result<ReplayOutcome, ReplayError> {
        let Some(remote_id) = item.target.as_remote() else {
            return Ok(ReplayOutcome::Skipped(
                "delete target was never confirmed by the remote store",
            ));
        };

        match item.entity_kind {
            EntityKind::Workout => self.remote.delete_workout(&item.owner, remote_id).await?,
            EntityKind::Meal => self.remote.delete_meal(&item.owner, remote_id).await?,
            EntityKind::WeightLog => {
                self.remote.delete_weight_log(&item.owner, remote_id).await?
            }
            EntityKind::Goal => return Ok(ReplayOutcome::Unsupported),
        }
        Ok(ReplayOutcome::Applied)
    }

    /// Re-keys a locally-created record under its confirmed remote id.
    async fn confirm_create<E: LocalEntity>(
        &self,
        owner: &str,
        local_id: &RecordId,
        remote_id: String,
    ) -> Result<(), StoreError> {
        if let Some(mut record) = self.store.get_by_id::<E>(owner, local_id).await? {
            self.store.delete::<E>(owner, local_id).await?;
            record.set_id(RecordId::remote(remote_id));
            self.store.put(&record, SyncState::Synced).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{Goal, GoalKind};
    use crate::remote::{GoalPayload, MealPayload, WeightLogPayload, WorkoutPayload};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
    use tempfile::TempDir;

    #[derive(Default)]
    struct StubState {
        workouts: HashMap<String, WorkoutPayload>,
        meals: HashMap<String, MealPayload>,
        weight_logs: HashMap<String, WeightLogPayload>,
        goals: HashMap<String, GoalPayload>,
        calls: Vec<String>,
        fail_remaining: u32,
        next_id: u32,
    }

    /// In-memory remote store with scriptable failures and call recording.
    #[derive(Clone, Default)]
    struct StubRemote(Arc<StdMutex<StubState>>);

    impl StubRemote {
        fn fail_times(&self, n: u32) {
            self.0.lock().unwrap().fail_remaining = n;
        }

        fn calls(&self) -> Vec<String> {
            self.0.lock().unwrap().calls.clone()
        }

        fn workouts(&self) -> HashMap<String, WorkoutPayload> {
            self.0.lock().unwrap().workouts.clone()
        }

        fn begin(&self, call: String) -> Result<MutexGuard<'_, StubState>, RemoteError> {
            let mut state = self.0.lock().unwrap();
            state.calls.push(call);
            if state.fail_remaining > 0 {
                state.fail_remaining -= 1;
                return Err(RemoteError::Connection("stub: injected failure".into()));
            }
            Ok(state)
        }
    }

    #[async_trait]
    impl RemoteStore for StubRemote {
        async fn create_workout(
            &self,
            owner: &str,
            payload: &WorkoutPayload,
        ) -> Result<String, RemoteError> {
            let mut state = self.begin(format!("create_workout {} {}", owner, payload.name))?;
            state.next_id += 1;
            let id = format!("w-{}", state.next_id);
            state.workouts.insert(id.clone(), payload.clone());
            Ok(id)
        }

        async fn update_workout(
            &self,
            owner: &str,
            id: &str,
            payload: &WorkoutPayload,
        ) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("update_workout {} {}", owner, id))?;
            state.workouts.insert(id.to_string(), payload.clone());
            Ok(())
        }

        async fn delete_workout(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("delete_workout {} {}", owner, id))?;
            state.workouts.remove(id);
            Ok(())
        }

        async fn create_meal(
            &self,
            owner: &str,
            payload: &MealPayload,
        ) -> Result<String, RemoteError> {
            let mut state = self.begin(format!("create_meal {} {}", owner, payload.name))?;
            state.next_id += 1;
            let id = format!("m-{}", state.next_id);
            state.meals.insert(id.clone(), payload.clone());
            Ok(id)
        }

        async fn update_meal(
            &self,
            owner: &str,
            id: &str,
            payload: &MealPayload,
        ) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("update_meal {} {}", owner, id))?;
            state.meals.insert(id.to_string(), payload.clone());
            Ok(())
        }

        async fn delete_meal(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("delete_meal {} {}", owner, id))?;
            state.meals.remove(id);
            Ok(())
        }

        async fn create_goal(
            &self,
            owner: &str,
            payload: &GoalPayload,
        ) -> Result<String, RemoteError> {
            let mut state = self.begin(format!("create_goal {} {}", owner, payload.title))?;
            state.next_id += 1;
            let id = format!("g-{}", state.next_id);
            state.goals.insert(id.clone(), payload.clone());
            Ok(id)
        }

        async fn update_goal(
            &self,
            owner: &str,
            id: &str,
            payload: &GoalPayload,
        ) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("update_goal {} {}", owner, id))?;
            state.goals.insert(id.to_string(), payload.clone());
            Ok(())
        }

        async fn delete_goal(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("delete_goal {} {}", owner, id))?;
            state.goals.remove(id);
            Ok(())
        }

        async fn create_weight_log(
            &self,
            owner: &str,
            payload: &WeightLogPayload,
        ) -> Result<String, RemoteError> {
            let mut state = self.begin(format!("create_weight_log {} {}", owner, payload.date))?;
            state.next_id += 1;
            let id = format!("wl-{}", state.next_id);
            state.weight_logs.insert(id.clone(), payload.clone());
            Ok(id)
        }

        async fn update_weight_log(
            &self,
            owner: &str,
            id: &str,
            payload: &WeightLogPayload,
        ) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("update_weight_log {} {}", owner, id))?;
            state.weight_logs.insert(id.to_string(), payload.clone());
            Ok(())
        }

        async fn delete_weight_log(&self, owner: &str, id: &str) -> Result<(), RemoteError> {
            let mut state = self.begin(format!("delete_weight_log {} {}", owner, id))?;
            state.weight_logs.remove(id);
            Ok(())
        }
    }

    struct TestHarness {
        store: LocalStore,
        remote: StubRemote,
        manager: SyncManager<StubRemote>,
        _temp_dir: TempDir,
    }

    async fn setup() -> TestHarness {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(Some(temp_dir.path().join("test.db"))).await.unwrap();
        let store = LocalStore::new(pool);
        let remote = StubRemote::default();
        let manager = SyncManager::new(store.clone(), remote.clone());
        TestHarness {
            store,
            remote,
            manager,
            _temp_dir: temp_dir,
        }
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    /// Stores an offline-created workout and its queued create, the way the
    /// gateway does while disconnected.
    async fn enqueue_offline_workout(harness: &TestHarness, name: &str) -> Workout {
        let workout = Workout::new("user1", name, test_date())
            .with_sets(3)
            .with_reps(10)
            .with_weight(40.0);
        harness
            .store
            .put(&workout, SyncState::Pending)
            .await
            .unwrap();
        harness
            .store
            .enqueue(&QueueItem::create(
                "user1",
                workout.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&workout)),
            ))
            .await
            .unwrap();
        workout
    }

    #[tokio::test]
    async fn test_drain_empty_queue() {
        let harness = setup().await;
        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(report.synced, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_offline_create_drains_to_remote() {
        let harness = setup().await;
        let workout = enqueue_offline_workout(&harness, "Bench Press").await;
        assert!(workout.id.is_local());

        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.synced, 1);
        assert_eq!(report.failed, 0);

        // Exactly one remote create, with the stripped payload
        assert_eq!(harness.remote.calls(), vec!["create_workout user1 Bench Press"]);
        let remote_workouts = harness.remote.workouts();
        let payload = remote_workouts.get("w-1").unwrap();
        assert_eq!((payload.sets, payload.reps, payload.weight), (3, 10, 40.0));

        // Queue empty, status clean
        let status = harness.manager.sync_status("user1").await.unwrap();
        assert_eq!(status.pending, 0);
        assert_eq!(status.failed, 0);

        // Local record re-keyed under the confirmed id, marked synced
        let old: Option<Workout> = harness
            .store
            .get_by_id("user1", &workout.id)
            .await
            .unwrap();
        assert!(old.is_none());
        let records: Vec<Workout> = harness.store.get_all_for_owner("user1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::remote("w-1"));
        assert_eq!(
            harness.store.pending_count::<Workout>("user1").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_drain_replays_oldest_first() {
        let harness = setup().await;

        // Enqueue out of order; enqueued_at decides replay order
        let base = Utc::now();
        for (offset, name) in [(2i64, "third"), (0, "first"), (1, "second")] {
            let workout = Workout::new("user1", name, test_date());
            let mut item = QueueItem::create(
                "user1",
                workout.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&workout)),
            );
            item.enqueued_at = base + Duration::seconds(offset);
            harness.store.put(&workout, SyncState::Pending).await.unwrap();
            harness.store.enqueue(&item).await.unwrap();
        }

        harness.manager.process_sync_queue("user1").await.unwrap();

        assert_eq!(
            harness.remote.calls(),
            vec![
                "create_workout user1 first",
                "create_workout user1 second",
                "create_workout user1 third",
            ]
        );
    }

    #[tokio::test]
    async fn test_second_concurrent_drain_returns_zero() {
        let harness = setup().await;
        enqueue_offline_workout(&harness, "Bench Press").await;

        // Simulate an in-flight drain by holding the lock
        let guard = harness.manager.drain_lock.try_lock().unwrap();
        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(report.synced, 0);
        assert_eq!(report.failed, 0);
        drop(guard);

        // Once the lock is free the drain runs
        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.synced, 1);
    }

    #[tokio::test]
    async fn test_failed_item_stays_queued_with_retry_bookkeeping() {
        let harness = setup().await;
        enqueue_offline_workout(&harness, "Flaky").await;
        harness.remote.fail_times(1);

        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].error.contains("injected failure"));

        let items = harness.store.queue_for_owner("user1").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].retry_count, 1);
        assert!(items[0].last_error.is_some());
    }

    #[tokio::test]
    async fn test_item_abandoned_after_max_retries() {
        let harness = setup().await;
        let workout = enqueue_offline_workout(&harness, "Doomed").await;
        harness.remote.fail_times(99);

        // Passes 1 and 2: retried
        for expected_retry in [1, 2] {
            let report = harness.manager.process_sync_queue("user1").await.unwrap();
            assert_eq!(report.failed, 1);
            let items = harness.store.queue_for_owner("user1").await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].retry_count, expected_retry);
        }

        // Pass 3: retry budget exhausted, item removed
        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.len(), 1);

        let status = harness.manager.sync_status("user1").await.unwrap();
        assert_eq!(status.pending, 0);

        // The cached record is still there, still pending; the operation is
        // lost from the queue and only the report ever said so.
        let cached: Option<Workout> =
            harness.store.get_by_id("user1", &workout.id).await.unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn test_two_failures_then_success_counts_synced() {
        let harness = setup().await;
        enqueue_offline_workout(&harness, "Eventually").await;
        harness.remote.fail_times(2);

        harness.manager.process_sync_queue("user1").await.unwrap();
        harness.manager.process_sync_queue("user1").await.unwrap();
        let report = harness.manager.process_sync_queue("user1").await.unwrap();

        assert_eq!(report.synced, 1);
        assert_eq!(report.failed, 0);
        let status = harness.manager.sync_status("user1").await.unwrap();
        assert_eq!(status.pending, 0);
        assert_eq!(harness.remote.workouts().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_per_item() {
        let harness = setup().await;

        let base = Utc::now();
        for (offset, name) in [(0i64, "fails"), (1, "succeeds")] {
            let workout = Workout::new("user1", name, test_date());
            let mut item = QueueItem::create(
                "user1",
                workout.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&workout)),
            );
            item.enqueued_at = base + Duration::seconds(offset);
            harness.store.put(&workout, SyncState::Pending).await.unwrap();
            harness.store.enqueue(&item).await.unwrap();
        }
        harness.remote.fail_times(1);

        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.synced, 1);
        assert_eq!(report.failed, 1);

        let items = harness.store.queue_for_owner("user1").await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_local_target_update_is_skipped_not_failed() {
        let harness = setup().await;

        let workout = Workout::new("user1", "Orphan", test_date());
        let item = QueueItem::update(
            "user1",
            workout.id.clone(), // still a local id, create never completed
            QueuePayload::Workout(WorkoutPayload::from(&workout)),
        );
        harness.store.enqueue(&item).await.unwrap();

        let report = harness.manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.attempted, 1);
        assert_eq!(report.synced, 0);
        assert_eq!(report.failed, 0);
        assert!(harness.remote.calls().is_empty());
        assert!(harness.store.queue_for_owner("user1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_create_then_delete_scenario() {
        let harness = setup().await;

        let workout = enqueue_offline_workout(&harness, "Short-lived").await;
        // User deletes the never-synced workout: local record removed,
        // delete queued against the local id.
        harness
            .store
            .delete::<Workout>("user1", &workout.id)
            .await
            .unwrap();
        let mut delete_item =
            QueueItem::delete("user1", EntityKind::Workout, workout.id.clone());
        delete_item.enqueued_at = Utc::now() + Duration::seconds(1);
        harness.store.enqueue(&delete_item).await.unwrap();

        let report = harness.manager.process_sync_queue("user1").await.unwrap();

        // Create replayed, delete skipped without counting as failed
        assert_eq!(report.attempted, 2);
        assert_eq!(report.synced, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(harness.remote.calls(), vec!["create_workout user1 Short-lived"]);
        assert!(harness.store.queue_for_owner("user1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_goal_items_left_queued() {
        let harness = setup().await;

        let goal = Goal::new("user1", "Cut to 80kg", GoalKind::Weight, 80.0);
        harness.store.put(&goal, SyncState::Pending).await.unwrap();
        harness
            .store
            .enqueue(&QueueItem::create(
                "user1",
                goal.id.clone(),
                QueuePayload::Goal(GoalPayload::from(&goal)),
            ))
            .await
            .unwrap();

        for _ in 0..2 {
            let report = harness.manager.process_sync_queue("user1").await.unwrap();
            assert_eq!(report.attempted, 1);
            assert_eq!(report.synced, 0);
            assert_eq!(report.failed, 0);

            // Never reaches zero for a user who edits goals offline
            let status = harness.manager.sync_status("user1").await.unwrap();
            assert_eq!(status.pending, 1);
        }
        assert!(harness.remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_replay_is_idempotent() {
        let harness = setup().await;

        // A record the remote store already knows about
        let mut workout = Workout::new("user1", "Press", test_date()).with_weight(50.0);
        workout.id = RecordId::remote("w-1");
        harness.store.put(&workout, SyncState::Pending).await.unwrap();

        let make_item = || {
            QueueItem::update(
                "user1",
                workout.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&workout)),
            )
        };

        harness.store.enqueue(&make_item()).await.unwrap();
        harness.manager.process_sync_queue("user1").await.unwrap();

        // Residual duplicate of the same update (crash between the remote
        // call and the queue removal)
        harness.store.enqueue(&make_item()).await.unwrap();
        harness.manager.process_sync_queue("user1").await.unwrap();

        let remote_workouts = harness.remote.workouts();
        assert_eq!(remote_workouts.len(), 1);
        assert_eq!(remote_workouts.get("w-1").unwrap().weight, 50.0);
        assert_eq!(
            harness.store.pending_count::<Workout>("user1").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_ordering_equivalence_with_online_run() {
        let harness = setup().await;

        // Seed a record both sides already agree on
        let mut seeded = Workout::new("user1", "Seeded", test_date());
        seeded.id = RecordId::remote("w-1");
        harness.store.put(&seeded, SyncState::Synced).await.unwrap();
        {
            let mut state = harness.remote.0.lock().unwrap();
            state.next_id = 1;
            state
                .workouts
                .insert("w-1".into(), WorkoutPayload::from(&seeded));
        }

        // Offline: create A, update the seeded record, delete the seeded
        // record, create B
        let base = Utc::now();
        let a = Workout::new("user1", "A", test_date());
        let mut updated = seeded.clone();
        updated.weight = 70.0;
        let b = Workout::new("user1", "B", test_date());

        let mut items = vec![
            QueueItem::create(
                "user1",
                a.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&a)),
            ),
            QueueItem::update(
                "user1",
                seeded.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&updated)),
            ),
            QueueItem::delete("user1", EntityKind::Workout, seeded.id.clone()),
            QueueItem::create(
                "user1",
                b.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&b)),
            ),
        ];
        for (offset, item) in items.iter_mut().enumerate() {
            item.enqueued_at = base + Duration::seconds(offset as i64);
        }
        harness.store.put(&a, SyncState::Pending).await.unwrap();
        harness.store.put(&b, SyncState::Pending).await.unwrap();
        for item in &items {
            harness.store.enqueue(item).await.unwrap();
        }

        harness.manager.process_sync_queue("user1").await.unwrap();

        // Same final entity set as issuing the calls online in order:
        // A and B exist, the seeded record is gone
        let remote_workouts = harness.remote.workouts();
        assert_eq!(remote_workouts.len(), 2);
        let names: Vec<&str> = {
            let mut names: Vec<&str> = remote_workouts
                .values()
                .map(|p| p.name.as_str())
                .collect();
            names.sort();
            names
        };
        assert_eq!(names, vec!["A", "B"]);
        assert!(!remote_workouts.contains_key("w-1"));
    }

    #[tokio::test]
    async fn test_sync_status_reflects_retries() {
        let harness = setup().await;

        enqueue_offline_workout(&harness, "Flaky").await;
        harness.remote.fail_times(1);
        harness.manager.process_sync_queue("user1").await.unwrap();

        let fresh = Workout::new("user1", "Fresh", test_date());
        harness.store.put(&fresh, SyncState::Pending).await.unwrap();
        harness
            .store
            .enqueue(&QueueItem::create(
                "user1",
                fresh.id.clone(),
                QueuePayload::Workout(WorkoutPayload::from(&fresh)),
            ))
            .await
            .unwrap();

        let status = harness.manager.sync_status("user1").await.unwrap();
        assert_eq!(status.pending, 2);
        assert_eq!(status.failed, 1);
        assert!(status.last_error.unwrap().contains("injected failure"));
    }

    #[tokio::test]
    async fn test_fresh_manager_instance_drains_after_restart() {
        // The drain guard lives in memory only; a new manager over the same
        // store (a reopened process) is free to drain.
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("restart.db");

        {
            let pool = init_db(Some(db_path.clone())).await.unwrap();
            let store = LocalStore::new(pool.clone());
            let workout = Workout::new("user1", "Across restart", test_date());
            store.put(&workout, SyncState::Pending).await.unwrap();
            store
                .enqueue(&QueueItem::create(
                    "user1",
                    workout.id.clone(),
                    QueuePayload::Workout(WorkoutPayload::from(&workout)),
                ))
                .await
                .unwrap();
            pool.close().await;
        }

        let pool = init_db(Some(db_path)).await.unwrap();
        let store = LocalStore::new(pool);
        let remote = StubRemote::default();
        let manager = SyncManager::new(store.clone(), remote.clone());

        let report = manager.process_sync_queue("user1").await.unwrap();
        assert_eq!(report.synced, 1);

        let records: Vec<Workout> = store.get_all_for_owner("user1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].id.is_local());
    }
}
