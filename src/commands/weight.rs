use clap::{Args, Subcommand};

use super::{parse_date, AppContext, OutputFormat};
use crate::models::{RecordId, WeightLog};

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Log a bodyweight measurement
    Add {
        /// Weight in kg
        weight_kg: f64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },

    /// List weight entries, newest first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a weight entry by id
    Delete {
        /// Weight entry id
        id: String,
    },
}

impl WeightCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeightSubcommand::Add {
                weight_kg,
                date,
                note,
            } => {
                let date = parse_date(date.as_deref())?;
                let mut log = WeightLog::new(ctx.owner(), *weight_kg, date);
                if let Some(note) = note {
                    log = log.with_note(note);
                }

                let id = ctx.gateway.add_weight_log(log).await?;
                if id.is_local() {
                    println!("Logged weight {} (offline, queued for sync)", id);
                } else {
                    println!("Logged weight {}", id);
                }
                ctx.maybe_auto_sync().await;
                Ok(())
            }
            WeightSubcommand::List { format } => {
                let logs: Vec<WeightLog> = ctx.store.get_all_for_owner(ctx.owner()).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&logs)?);
                    }
                    OutputFormat::Text => {
                        if logs.is_empty() {
                            println!("No weight entries.");
                        }
                        for log in &logs {
                            println!("{}  [{}]", log, log.id);
                        }
                    }
                }
                Ok(())
            }
            WeightSubcommand::Delete { id } => {
                let id: RecordId = id.parse()?;
                ctx.gateway.delete_weight_log(ctx.owner(), &id).await?;
                println!("Deleted weight entry {}", id);
                ctx.maybe_auto_sync().await;
                Ok(())
            }
        }
    }
}
