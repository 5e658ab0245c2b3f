use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four record collections the local store caches and the sync queue
/// can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Workout,
    Meal,
    Goal,
    WeightLog,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Workout,
        EntityKind::Meal,
        EntityKind::Goal,
        EntityKind::WeightLog,
    ];

    /// Local store table name.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Workout => "workouts",
            EntityKind::Meal => "meals",
            EntityKind::Goal => "goals",
            EntityKind::WeightLog => "weight_logs",
        }
    }

    /// Remote API collection path segment.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Workout => "workouts",
            EntityKind::Meal => "meals",
            EntityKind::Goal => "goals",
            EntityKind::WeightLog => "weight-logs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Workout => write!(f, "workout"),
            EntityKind::Meal => write!(f, "meal"),
            EntityKind::Goal => write!(f, "goal"),
            EntityKind::WeightLog => write!(f, "weight_log"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workout" => Ok(EntityKind::Workout),
            "meal" => Ok(EntityKind::Meal),
            "goal" => Ok(EntityKind::Goal),
            "weight_log" => Ok(EntityKind::WeightLog),
            _ => Err(format!(
                "Invalid entity kind '{}'. Valid options: workout, meal, goal, weight_log",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_table_names() {
        assert_eq!(EntityKind::Workout.table(), "workouts");
        assert_eq!(EntityKind::WeightLog.table(), "weight_logs");
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("pose".parse::<EntityKind>().is_err());
    }
}
