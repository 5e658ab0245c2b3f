use clap::{Args, Subcommand};

use super::{parse_date, AppContext, OutputFormat};
use crate::models::{Goal, GoalKind, RecordId};

#[derive(Args)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub command: GoalSubcommand,
}

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Set a goal
    ///
    /// Note: goal edits made while offline are queued but not yet replayed
    /// to the server; `fitsync sync status` will keep counting them.
    Add {
        /// Short description
        title: String,

        /// Goal kind (weight, workouts_per_week, calories)
        #[arg(long, short, value_name = "KIND")]
        kind: String,

        /// Target value
        #[arg(long)]
        target: f64,

        /// Current value
        #[arg(long, default_value_t = 0.0)]
        current: f64,

        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
    },

    /// List goals
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a goal by id
    Delete {
        /// Goal id
        id: String,
    },
}

impl GoalCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GoalSubcommand::Add {
                title,
                kind,
                target,
                current,
                deadline,
            } => {
                let kind: GoalKind = kind.parse()?;
                let mut goal =
                    Goal::new(ctx.owner(), title, kind, *target).with_current(*current);
                if let Some(deadline) = deadline {
                    goal = goal.with_deadline(parse_date(Some(deadline))?);
                }

                let id = ctx.gateway.add_goal(goal).await?;
                if id.is_local() {
                    println!("Set goal {} (offline, queued for sync)", id);
                } else {
                    println!("Set goal {}", id);
                }
                ctx.maybe_auto_sync().await;
                Ok(())
            }
            GoalSubcommand::List { format } => {
                let goals: Vec<Goal> = ctx.store.get_all_for_owner(ctx.owner()).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&goals)?);
                    }
                    OutputFormat::Text => {
                        if goals.is_empty() {
                            println!("No goals set.");
                        }
                        for goal in &goals {
                            println!(
                                "{}  ({:.0}%)  [{}]",
                                goal,
                                goal.progress() * 100.0,
                                goal.id
                            );
                        }
                    }
                }
                Ok(())
            }
            GoalSubcommand::Delete { id } => {
                let id: RecordId = id.parse()?;
                ctx.gateway.delete_goal(ctx.owner(), &id).await?;
                println!("Deleted goal {}", id);
                ctx.maybe_auto_sync().await;
                Ok(())
            }
        }
    }
}
