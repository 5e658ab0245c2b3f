use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record_id::RecordId;

/// A bodyweight measurement for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightLog {
    pub id: RecordId,
    pub owner: String,
    pub weight_kg: f64,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeightLog {
    pub fn new(owner: impl Into<String>, weight_kg: f64, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::local(),
            owner: owner.into(),
            weight_kg,
            date,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl fmt::Display for WeightLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}kg", self.date, self.weight_kg)?;
        if let Some(note) = &self.note {
            write!(f, " ({})", note)?;
        }
        Ok(())
    }
}
