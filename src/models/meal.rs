use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record_id::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "breakfast"),
            MealType::Lunch => write!(f, "lunch"),
            MealType::Dinner => write!(f, "dinner"),
            MealType::Snack => write!(f, "snack"),
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(format!(
                "Invalid meal type '{}'. Valid options: breakfast, lunch, dinner, snack",
                s
            )),
        }
    }
}

/// A logged meal with its nutrition summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: RecordId,
    pub owner: String,
    pub name: String,
    pub meal_type: MealType,
    pub calories: u32,
    /// Grams of protein, when tracked.
    pub protein: Option<f64>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        meal_type: MealType,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::local(),
            owner: owner.into(),
            name: name.into(),
            meal_type,
            calories: 0,
            protein: None,
            date,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_calories(mut self, calories: u32) -> Self {
        self.calories = calories;
        self
    }

    pub fn with_protein(mut self, protein: f64) -> Self {
        self.protein = Some(protein);
        self
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}): {} kcal",
            self.date, self.name, self.meal_type, self.calories
        )?;
        if let Some(protein) = self.protein {
            write!(f, ", {}g protein", protein)?;
        }
        Ok(())
    }
}
