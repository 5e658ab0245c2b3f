mod entity_kind;
mod goal;
mod meal;
mod record_id;
mod weight_log;
mod workout;

pub use entity_kind::EntityKind;
pub use goal::{Goal, GoalKind};
pub use meal::{Meal, MealType};
pub use record_id::{RecordId, RecordIdError, LOCAL_ID_PREFIX};
pub use weight_log::WeightLog;
pub use workout::Workout;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A cacheable entity the local store can persist and the sync engine can
/// replay. Ties each entity type to its collection and exposes the fields
/// the store indexes on; `sync_status` is store bookkeeping and deliberately
/// not part of this surface.
pub trait LocalEntity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    fn owner(&self) -> &str;
    /// The date records of this kind are listed by, newest first.
    fn entity_date(&self) -> NaiveDate;
}

impl LocalEntity for Workout {
    const KIND: EntityKind = EntityKind::Workout;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn entity_date(&self) -> NaiveDate {
        self.date
    }
}

impl LocalEntity for Meal {
    const KIND: EntityKind = EntityKind::Meal;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn entity_date(&self) -> NaiveDate {
        self.date
    }
}

impl LocalEntity for Goal {
    const KIND: EntityKind = EntityKind::Goal;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    // Goals have no natural entry date; list by creation day.
    fn entity_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

impl LocalEntity for WeightLog {
    const KIND: EntityKind = EntityKind::WeightLog;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn entity_date(&self) -> NaiveDate {
        self.date
    }
}
