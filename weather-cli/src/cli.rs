use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use weather_core::{LaunchProfile, Orchestrator, PageId, TomlSettings, WeatherRequest};

use crate::shell;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather app")]
pub struct Cli {
    /// Settings file to use instead of the platform config location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive app (default).
    Run,

    /// Store the OpenWeather API key.
    Configure,

    /// Show weather for a city without opening the app.
    Show {
        /// City or location name.
        city: String,

        /// Optional date/time (RFC 3339 or "YYYY-MM-DD HH:MM", UTC); if absent, means "now".
        #[arg(long)]
        date: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = match self.config {
            Some(path) => TomlSettings::open(path)?,
            None => TomlSettings::open_default()?,
        };
        let profile = LaunchProfile::from_env()?;
        let mut app = shell::orchestrator(settings, &profile);

        match self.command.unwrap_or(Command::Run) {
            Command::Run => shell::run(&mut app).await,
            Command::Configure => configure(&mut app),
            Command::Show { city, date } => show(&app, &city, date.as_deref()).await,
        }
    }
}

fn configure(app: &mut Orchestrator) -> anyhow::Result<()> {
    app.navigate_to(PageId::Configuration);
    if shell::edit_api_key(app)? {
        println!("API key saved.");
    }
    Ok(())
}

async fn show(app: &Orchestrator, city: &str, date: Option<&str>) -> anyhow::Result<()> {
    let Some(service) = app.service() else {
        println!("{}", app.messages().no_api_key);
        println!("Hint: run `weather configure` and enter your API key.");
        return Ok(());
    };

    let when = date.map(parse_date).transpose()?;
    let request = WeatherRequest { address: city.to_string(), when };
    let res = service.get_weather(&request).await?;

    println!("{}", res.location_name);
    println!("  {:.1} °C (feels like {:.1} °C), {}", res.temperature_c, res.feels_like_c, res.condition);
    println!("  humidity {}%, wind {:.1} m/s", res.humidity_pct, res.wind_speed_mps);
    println!("  observed {}", res.observation_time.format("%Y-%m-%d %H:%M UTC"));

    Ok(())
}

fn parse_date(input: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .map(|naive| naive.and_utc())
        .with_context(|| format!("Invalid date '{input}'. Use RFC 3339 or \"YYYY-MM-DD HH:MM\"."))
}
