use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record_id::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Weight,
    WorkoutsPerWeek,
    Calories,
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalKind::Weight => write!(f, "weight"),
            GoalKind::WorkoutsPerWeek => write!(f, "workouts_per_week"),
            GoalKind::Calories => write!(f, "calories"),
        }
    }
}

impl FromStr for GoalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weight" => Ok(GoalKind::Weight),
            "workouts_per_week" => Ok(GoalKind::WorkoutsPerWeek),
            "calories" => Ok(GoalKind::Calories),
            _ => Err(format!(
                "Invalid goal kind '{}'. Valid options: weight, workouts_per_week, calories",
                s
            )),
        }
    }
}

/// A fitness target the user is working toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: RecordId,
    pub owner: String,
    pub title: String,
    pub kind: GoalKind,
    pub target: f64,
    pub current: f64,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        owner: impl Into<String>,
        title: impl Into<String>,
        kind: GoalKind,
        target: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::local(),
            owner: owner.into(),
            title: title.into(),
            kind,
            target,
            current: 0.0,
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_current(mut self, current: f64) -> Self {
        self.current = current;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Progress toward the target as a fraction in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.target == 0.0 {
            return 0.0;
        }
        (self.current / self.target).clamp(0.0, 1.0)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}/{}",
            self.title, self.kind, self.current, self.target
        )?;
        if let Some(deadline) = self.deadline {
            write!(f, " by {}", deadline)?;
        }
        Ok(())
    }
}
