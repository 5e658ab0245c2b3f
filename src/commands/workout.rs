use clap::{Args, Subcommand};

use super::{parse_date, AppContext, OutputFormat};
use crate::models::{RecordId, Workout};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a workout
    Add {
        /// Exercise name
        name: String,

        /// Number of sets
        #[arg(long, default_value_t = 3)]
        sets: u32,

        /// Reps per set
        #[arg(long, default_value_t = 10)]
        reps: u32,

        /// Working weight in kg
        #[arg(long, default_value_t = 0.0)]
        weight: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List workouts, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a workout by id
    Delete {
        /// Workout id
        id: String,
    },
}

impl WorkoutCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WorkoutSubcommand::Add {
                name,
                sets,
                reps,
                weight,
                date,
                notes,
            } => {
                let date = parse_date(date.as_deref())?;
                let mut workout = Workout::new(ctx.owner(), name, date)
                    .with_sets(*sets)
                    .with_reps(*reps)
                    .with_weight(*weight);
                if let Some(notes) = notes {
                    workout = workout.with_notes(notes);
                }

                let id = ctx.gateway.add_workout(workout).await?;
                if id.is_local() {
                    println!("Logged workout {} (offline, queued for sync)", id);
                } else {
                    println!("Logged workout {}", id);
                }
                ctx.maybe_auto_sync().await;
                Ok(())
            }
            WorkoutSubcommand::List { format } => {
                let workouts: Vec<Workout> = ctx.store.get_all_for_owner(ctx.owner()).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&workouts)?);
                    }
                    OutputFormat::Text => {
                        if workouts.is_empty() {
                            println!("No workouts logged.");
                        }
                        for workout in &workouts {
                            println!("{}  [{}]", workout, workout.id);
                        }
                    }
                }
                Ok(())
            }
            WorkoutSubcommand::Delete { id } => {
                let id: RecordId = id.parse()?;
                ctx.gateway.delete_workout(ctx.owner(), &id).await?;
                println!("Deleted workout {}", id);
                ctx.maybe_auto_sync().await;
                Ok(())
            }
        }
    }
}
