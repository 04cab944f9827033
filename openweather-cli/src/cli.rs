use anyhow::Context;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use openweather_sdk::{Config, Mode, SdkRegistry, WeatherReport};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "openweather", version, about = "OpenWeather SDK CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key used by later invocations.
    Configure,

    /// Show current weather for a city as canonical JSON.
    Show {
        /// City name, e.g. "London".
        city: String,
    },

    /// Keep a polling client alive and print the report every period.
    Watch {
        /// City name, e.g. "London".
        city: String,

        /// Polling period in seconds (floored to 60 by the SDK);
        /// defaults to the configured value, then to 600.
        #[arg(long)]
        interval: Option<u64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
            Command::Watch { city, interval } => watch(&city, interval).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.api_key()?;

    let registry = SdkRegistry::new();
    let client = registry.create(api_key, Mode::OnDemand, 0)?;

    let report = client.get_weather(city).await?;
    print_report(&report)?;

    client.delete();
    Ok(())
}

async fn watch(city: &str, interval: Option<u64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.api_key()?;
    let interval = interval.or(config.poll_interval_secs).unwrap_or(600);

    let registry = SdkRegistry::new();
    let client = registry.create(api_key, Mode::Polling, interval)?;

    // The first lookup seeds the cache; the background task keeps the
    // entry fresh, so later iterations read the refreshed report.
    loop {
        let report = client.get_weather(city).await?;
        print_report(&report)?;
        tokio::time::sleep(client.poll_interval()).await;
    }
}

fn print_report(report: &WeatherReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    if let Some(observed) = DateTime::from_timestamp(report.datetime, 0) {
        println!("observed at {observed}");
    }
    Ok(())
}
