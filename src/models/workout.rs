use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record_id::RecordId;

/// A single strength-training session entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: RecordId,
    pub owner: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    /// Working weight in kilograms.
    pub weight: f64,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// Creates a workout with a fresh local id; the id is replaced with a
    /// remote one once the remote store confirms the create.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::local(),
            owner: owner.into(),
            name: name.into(),
            sets: 0,
            reps: 0,
            weight: 0.0,
            date,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_sets(mut self, sets: u32) -> Self {
        self.sets = sets;
        self
    }

    pub fn with_reps(mut self, reps: u32) -> Self {
        self.reps = reps;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}: {}x{} @ {}kg",
            self.date, self.name, self.sets, self.reps, self.weight
        )?;
        if let Some(notes) = &self.notes {
            write!(f, " ({})", notes)?;
        }
        Ok(())
    }
}
