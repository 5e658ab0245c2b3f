mod config_cmd;
mod goal;
mod meal;
mod sync_cmd;
mod weight;
mod workout;

pub use config_cmd::ConfigCommand;
pub use goal::GoalCommand;
pub use meal::MealCommand;
pub use sync_cmd::SyncCommand;
pub use weight::WeightCommand;
pub use workout::WorkoutCommand;

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;

use crate::config::Config;
use crate::connectivity::ConnectivityMonitor;
use crate::db::{init_db, LocalStore};
use crate::gateway::MutationGateway;
use crate::remote::HttpRemoteStore;
use crate::sync::SyncManager;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a command needs: the store, the write surface and the sync
/// engine, wired against the configured remote.
pub struct AppContext {
    pub config: Config,
    pub store: LocalStore,
    pub monitor: Arc<ConnectivityMonitor>,
    pub gateway: MutationGateway<HttpRemoteStore>,
    pub manager: SyncManager<HttpRemoteStore>,
}

impl AppContext {
    /// Opens the local store and probes the remote server once to settle
    /// the initial connectivity flag. With no server configured the app
    /// simply stays offline and every write is queued.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = init_db(Some(config.database_path.value.clone())).await?;
        let store = LocalStore::new(pool);

        let remote = HttpRemoteStore::new(
            config.remote.server_url.clone().unwrap_or_default(),
            config.remote.api_key.clone(),
        );
        let monitor = Arc::new(ConnectivityMonitor::new(false));
        if let Some(url) = &config.remote.server_url {
            monitor.refresh_from_probe(url).await;
        }

        let gateway = MutationGateway::new(store.clone(), remote.clone(), monitor.clone());
        let manager = SyncManager::new(store.clone(), remote);

        Ok(Self {
            config,
            store,
            monitor,
            gateway,
            manager,
        })
    }

    pub fn owner(&self) -> &str {
        &self.config.owner.value
    }

    /// Drains the queue after a write when auto_sync is on. Errors are
    /// logged, not surfaced; the CLI keeps working offline.
    pub async fn maybe_auto_sync(&self) {
        if !self.config.remote.auto_sync || !self.config.remote.is_configured() {
            return;
        }
        if !self.monitor.is_online() {
            return;
        }
        if let Err(e) = self.manager.process_sync_queue(self.owner()).await {
            tracing::warn!("auto-sync failed: {}", e);
        }
    }
}

/// Parses a YYYY-MM-DD argument, defaulting to today.
pub fn parse_date(value: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date '{}'. Expected YYYY-MM-DD", s).into()),
        None => Ok(Local::now().date_naive()),
    }
}
