use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("database_path: {}", config.database_path.value.display());
                        println!("  source: {}", config.database_path.source);
                        println!();

                        println!("owner: {}", config.owner.value);
                        println!("  source: {}", config.owner.source);
                        println!();

                        match &config.remote.server_url {
                            Some(url) => {
                                println!("remote.server_url: {}", url);
                                println!(
                                    "remote.api_key: {}",
                                    if config.remote.api_key.is_some() {
                                        "(set)"
                                    } else {
                                        "(not set)"
                                    }
                                );
                                println!("remote.auto_sync: {}", config.remote.auto_sync);
                            }
                            None => println!("remote: not configured"),
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
