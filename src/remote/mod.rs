//! Interface to the remote durable store.
//!
//! The sync engine depends only on the per-entity create/update/delete
//! calls defined here, never on the remote store's query model. The payload
//! structs are the remote-facing shapes: conversions from the cached
//! entities strip everything the remote store has no business seeing
//! (record id, owner, sync bookkeeping, local timestamps).

mod http;

pub use http::{check_remote, HttpRemoteStore};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Goal, GoalKind, Meal, MealType, WeightLog, Workout};

/// Errors from remote store calls. All of these are transient from the
/// sync manager's point of view and count against an item's retry budget.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPayload {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl From<&Workout> for WorkoutPayload {
    fn from(workout: &Workout) -> Self {
        Self {
            name: workout.name.clone(),
            sets: workout.sets,
            reps: workout.reps,
            weight: workout.weight,
            date: workout.date,
            notes: workout.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPayload {
    pub name: String,
    pub meal_type: MealType,
    pub calories: u32,
    pub protein: Option<f64>,
    pub date: NaiveDate,
}

impl From<&Meal> for MealPayload {
    fn from(meal: &Meal) -> Self {
        Self {
            name: meal.name.clone(),
            meal_type: meal.meal_type,
            calories: meal.calories,
            protein: meal.protein,
            date: meal.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPayload {
    pub title: String,
    pub kind: GoalKind,
    pub target: f64,
    pub current: f64,
    pub deadline: Option<NaiveDate>,
}

impl From<&Goal> for GoalPayload {
    fn from(goal: &Goal) -> Self {
        Self {
            title: goal.title.clone(),
            kind: goal.kind,
            target: goal.target,
            current: goal.current,
            deadline: goal.deadline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightLogPayload {
    pub weight_kg: f64,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl From<&WeightLog> for WeightLogPayload {
    fn from(log: &WeightLog) -> Self {
        Self {
            weight_kg: log.weight_kg,
            date: log.date,
            note: log.note.clone(),
        }
    }
}

/// Per-entity create/update/delete against the remote store. `create_*`
/// returns the remote-assigned id; update/delete target ids must already
/// be remote-assigned.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create_workout(
        &self,
        owner: &str,
        payload: &WorkoutPayload,
    ) -> Result<String, RemoteError>;
    async fn update_workout(
        &self,
        owner: &str,
        id: &str,
        payload: &WorkoutPayload,
    ) -> Result<(), RemoteError>;
    async fn delete_workout(&self, owner: &str, id: &str) -> Result<(), RemoteError>;

    async fn create_meal(&self, owner: &str, payload: &MealPayload)
        -> Result<String, RemoteError>;
    async fn update_meal(
        &self,
        owner: &str,
        id: &str,
        payload: &MealPayload,
    ) -> Result<(), RemoteError>;
    async fn delete_meal(&self, owner: &str, id: &str) -> Result<(), RemoteError>;

    async fn create_goal(&self, owner: &str, payload: &GoalPayload)
        -> Result<String, RemoteError>;
    async fn update_goal(
        &self,
        owner: &str,
        id: &str,
        payload: &GoalPayload,
    ) -> Result<(), RemoteError>;
    async fn delete_goal(&self, owner: &str, id: &str) -> Result<(), RemoteError>;

    async fn create_weight_log(
        &self,
        owner: &str,
        payload: &WeightLogPayload,
    ) -> Result<String, RemoteError>;
    async fn update_weight_log(
        &self,
        owner: &str,
        id: &str,
        payload: &WeightLogPayload,
    ) -> Result<(), RemoteError>;
    async fn delete_weight_log(&self, owner: &str, id: &str) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_workout_payload_strips_local_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let workout = Workout::new("user1", "Bench Press", date)
            .with_sets(3)
            .with_reps(10)
            .with_weight(40.0);

        let payload = WorkoutPayload::from(&workout);
        assert_eq!(payload.sets, 3);
        assert_eq!(payload.reps, 10);
        assert_eq!(payload.weight, 40.0);

        // Nothing device-local crosses the wire
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("owner").is_none());
        assert!(json.get("created_at").is_none());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn test_meal_payload_strips_local_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let meal = Meal::new("user1", "Oatmeal", MealType::Breakfast, date).with_calories(350);

        let payload = MealPayload::from(&meal);
        assert_eq!(payload.calories, 350);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("owner").is_none());
    }
}
