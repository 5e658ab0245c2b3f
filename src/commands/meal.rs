use clap::{Args, Subcommand};

use super::{parse_date, AppContext, OutputFormat};
use crate::models::{Meal, MealType, RecordId};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal
    Add {
        /// What was eaten
        name: String,

        /// Meal type (breakfast, lunch, dinner, snack)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// Calories
        #[arg(long, default_value_t = 0)]
        calories: u32,

        /// Grams of protein
        #[arg(long)]
        protein: Option<f64>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },

    /// List meals, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a meal by id
    Delete {
        /// Meal id
        id: String,
    },
}

impl MealCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Add {
                name,
                meal_type,
                calories,
                protein,
                date,
            } => {
                let meal_type: MealType = meal_type.parse()?;
                let date = parse_date(date.as_deref())?;
                let mut meal =
                    Meal::new(ctx.owner(), name, meal_type, date).with_calories(*calories);
                if let Some(protein) = protein {
                    meal = meal.with_protein(*protein);
                }

                let id = ctx.gateway.add_meal(meal).await?;
                if id.is_local() {
                    println!("Logged meal {} (offline, queued for sync)", id);
                } else {
                    println!("Logged meal {}", id);
                }
                ctx.maybe_auto_sync().await;
                Ok(())
            }
            MealSubcommand::List { format } => {
                let meals: Vec<Meal> = ctx.store.get_all_for_owner(ctx.owner()).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&meals)?);
                    }
                    OutputFormat::Text => {
                        if meals.is_empty() {
                            println!("No meals logged.");
                        }
                        for meal in &meals {
                            println!("{}  [{}]", meal, meal.id);
                        }
                    }
                }
                Ok(())
            }
            MealSubcommand::Delete { id } => {
                let id: RecordId = id.parse()?;
                ctx.gateway.delete_meal(ctx.owner(), &id).await?;
                println!("Deleted meal {}", id);
                ctx.maybe_auto_sync().await;
                Ok(())
            }
        }
    }
}
