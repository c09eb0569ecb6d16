use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use skycast_core::{
    ClientConfig, Config, Query, RequestError, WeatherClient, WeatherLookup, WeatherReading,
    config::DEFAULT_BASE_URL,
};

use crate::view;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather from OpenWeather")]
pub struct Cli {
    /// Print the provider's JSON instead of the formatted reading.
    #[arg(long, global = true)]
    pub raw: bool,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key (and optionally a custom endpoint) in the settings file.
    Configure,

    /// Current weather for a city name, e.g. "London" or "London,GB".
    City {
        city: String,

        /// Units system: metric, imperial or standard.
        #[arg(long)]
        units: Option<String>,
    },

    /// Current weather for a postal code within a country.
    Zip {
        postal_code: String,

        /// Two-letter country code, e.g. "US".
        country_code: String,

        #[arg(long)]
        units: Option<String>,
    },

    /// Current weather at geographic coordinates.
    #[command(allow_negative_numbers = true)]
    Coords {
        latitude: String,
        longitude: String,

        #[arg(long)]
        units: Option<String>,
    },
}

impl Command {
    /// The lookup this command asks for; `None` for non-lookup commands.
    pub fn query(&self) -> Option<Query> {
        let query = match self {
            Command::Configure => return None,
            Command::City { city, units } => Query::by_city(city).with_units(units.as_deref()),
            Command::Zip {
                postal_code,
                country_code,
                units,
            } => Query::by_postal_code(postal_code, country_code).with_units(units.as_deref()),
            Command::Coords {
                latitude,
                longitude,
                units,
            } => Query::by_coordinates(latitude, longitude).with_units(units.as_deref()),
        };
        Some(query)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Some(query) = self.command.query() else {
            return configure();
        };

        let config = ClientConfig::resolve(&Config::load()?)?;
        let client = WeatherClient::new(config);

        let out = lookup(&client, &query, self.raw).await?;
        println!("{out}");

        Ok(())
    }
}

/// Run one lookup and turn the payload into printable text.
pub async fn lookup(
    source: &dyn WeatherLookup,
    query: &Query,
    raw: bool,
) -> anyhow::Result<String> {
    let payload = source.fetch(query).await.map_err(describe_failure)?;

    if raw {
        return serde_json::to_string_pretty(&payload).context("Failed to format weather payload");
    }

    let reading = WeatherReading::from_payload(&payload)
        .context("Unexpected weather payload from provider")?;

    Ok(view::render(&reading, query.units()))
}

fn describe_failure(err: RequestError) -> anyhow::Error {
    // The request URL carries the API key; keep it out of the printed cause chain.
    let err = match err {
        RequestError::Transport(e) => RequestError::Transport(e.without_url()),
        other => other,
    };

    let headline = match err.upstream_message() {
        Some(msg) => format!("Weather lookup failed: {msg}"),
        None => "Weather lookup failed".to_string(),
    };
    anyhow::Error::new(err).context(headline)
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let current_base = cfg.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Text::new("Base URL:")
        .with_default(&current_base)
        .prompt()
        .context("Failed to read base URL")?;

    cfg.api_key = Some(api_key.trim().to_string());
    cfg.base_url = (base_url.trim() != DEFAULT_BASE_URL).then(|| base_url.trim().to_string());

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
