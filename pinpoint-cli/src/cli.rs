use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};
use pinpoint_core::{Config, Session, provider_from_config};

use crate::{explore, render::View};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "pinpoint", version, about = "Current weather for a point on the map")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the forecast endpoint, request timeout and log filter.
    Configure,

    /// Print the location of the config file.
    ConfigPath,

    /// Tap a single point and print its weather.
    Show {
        /// Latitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        /// Longitude in decimal degrees.
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Tap points interactively; later taps supersede earlier ones.
    Explore,
}

impl Cli {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(config)?,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
            Command::Show {
                latitude,
                longitude,
            } => {
                let provider = provider_from_config(&config)?;
                let mut session = Session::new(provider);

                session.select(latitude, longitude);
                print!("{}", View::from(&session.selection()));

                let settled = session.settle().await;
                print!("{}", View::from(&settled));
            }
            Command::Explore => {
                let provider = provider_from_config(&config)?;
                explore::run(provider).await?;
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let endpoint = Text::new("Forecast endpoint:")
        .with_default(config.endpoint())
        .prompt()
        .context("Endpoint prompt was cancelled")?;
    config.set_endpoint(&endpoint)?;

    let timeout = CustomType::<u64>::new("Request timeout in seconds (0 for none):")
        .with_default(config.request_timeout_secs.unwrap_or(0))
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Timeout prompt was cancelled")?;
    config.set_request_timeout_secs(timeout);

    let log_filter = Text::new("Log filter (empty for default):")
        .with_default(config.log_filter.as_deref().unwrap_or(""))
        .prompt()
        .context("Log filter prompt was cancelled")?;
    let log_filter = log_filter.trim();
    config.log_filter = (!log_filter.is_empty()).then(|| log_filter.to_string());

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
