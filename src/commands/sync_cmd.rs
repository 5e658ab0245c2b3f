//! Sync CLI commands for draining and inspecting the offline queue.

use clap::{Args, Subcommand};

use super::AppContext;

/// Sync queued mutations with the remote store
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Show queue and server status
    Status,
}

impl SyncCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.sync(ctx).await,
            Some(SyncSubcommand::Status) => self.status(ctx).await,
        }
    }

    async fn sync(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let Some(server_url) = ctx.config.remote.server_url.as_ref() else {
            print_not_configured();
            return Ok(());
        };

        if !ctx.monitor.refresh_from_probe(server_url).await {
            println!("Server unreachable; queued mutations will wait for the next sync.");
            return Ok(());
        }

        println!("Syncing with {}...", server_url);
        println!();

        let report = ctx.manager.process_sync_queue(ctx.owner()).await?;

        if report.attempted == 0 {
            println!("Nothing to sync.");
            return Ok(());
        }

        println!("  {} attempted", report.attempted);
        println!("  {} synced", report.synced);
        if report.failed > 0 {
            println!("  {} failed", report.failed);
            for error in &report.errors {
                println!("    ✗ {}: {}", error.id, error.error);
            }
        }

        let status = ctx.manager.sync_status(ctx.owner()).await?;
        println!();
        if status.pending == 0 {
            println!("Sync complete.");
        } else {
            println!("{} mutation(s) still queued.", status.pending);
        }

        Ok(())
    }

    async fn status(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Status");
        println!("===========");
        println!();

        match ctx.config.remote.server_url.as_ref() {
            Some(server_url) => {
                let reachable = ctx.monitor.refresh_from_probe(server_url).await;
                println!("Server:    {}", server_url);
                println!(
                    "Network:   {}",
                    if reachable { "online" } else { "offline" }
                );
            }
            None => {
                print_not_configured();
                println!();
            }
        }

        let status = ctx.manager.sync_status(ctx.owner()).await?;
        println!("Pending:   {}", status.pending);
        println!("Failed:    {}", status.failed);
        if let Some(last_error) = &status.last_error {
            println!("Last error: {}", last_error);
        }

        Ok(())
    }
}

fn print_not_configured() {
    println!("Sync is not configured.");
    println!();
    println!("To enable sync, add to your config file:");
    println!();
    println!("  remote:");
    println!("    server_url: \"http://localhost:8080\"");
    println!("    api_key: \"your-api-key\"");
    println!("    auto_sync: false");
    println!();
    println!("Or set environment variables:");
    println!("  FITSYNC_SERVER_URL");
    println!("  FITSYNC_API_KEY");
}
