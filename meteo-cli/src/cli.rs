use anyhow::{Context, anyhow, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use inquire::{CustomType, Select, Text, validator::Validation};
use meteo_core::{
    AppContext, Completion, Config, Coordinates, GeocodingResult,
    config::API_BASE_ENV,
    service::MAX_FORECAST_DAYS,
    view::{SharedError, search::MIN_QUERY_CHARS, weather::WeatherView},
};
use std::{fmt, path::Path};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::render;

/// Offered as the default answer in `meteo configure`.
const SUGGESTED_API_BASE: &str = "https://api.open-meteo.com/v1";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Search cities and show their weather")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the forecast API base URL and display defaults.
    Configure,

    /// List places matching a name.
    Search {
        /// Place name, at least three characters.
        query: String,
    },

    /// Show weather for a city name (first geocoding match), or for the
    /// configured default location when no city is given.
    Show {
        city: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show weather at explicit coordinates.
    At {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Search, pick one of the matches interactively, then show its weather.
    Pick {
        query: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, Copy, Args)]
pub struct OutputArgs {
    /// Forecast days to request (1-16); defaults to the configured value.
    #[arg(long)]
    pub days: Option<u8>,

    /// Also print the next 24 hours.
    #[arg(long)]
    pub hourly: bool,
}

impl Cli {
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(self.verbose)));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => search(&load_app(None)?, &query).await,
            Command::Show { city, output } => {
                let app = load_app(output.days)?;
                let weather = app.weather();
                match city {
                    Some(city) => {
                        weather.fetch_weather_by_city(&city).await;
                    }
                    None => {
                        if weather.refresh().await == Completion::Skipped {
                            bail!(
                                "No city given and no default location configured; \
                                 run `meteo configure` or pass a city name."
                            );
                        }
                    }
                }
                print_weather(&app, &weather.snapshot(), output.hourly)
            }
            Command::At {
                latitude,
                longitude,
                output,
            } => {
                let app = load_app(output.days)?;
                let weather = app.weather();
                weather
                    .fetch_weather(Coordinates::new(latitude, longitude))
                    .await;
                print_weather(&app, &weather.snapshot(), output.hourly)
            }
            Command::Pick { query, output } => {
                pick(&load_app(output.days)?, &query, output.hourly).await
            }
        }
    }
}

/// Load `.env` from `path`, or search upwards from the working directory when
/// `None`. A missing file is fine; a malformed one is an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<(), dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    match loaded {
        Err(err) if err.not_found() => Ok(()),
        other => other,
    }
}

const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn load_app(days: Option<u8>) -> anyhow::Result<AppContext> {
    let mut config = Config::load()?;
    if days.is_some() {
        config.forecast_days = days;
    }

    if !config.has_api_base() {
        warn!(
            "No forecast API base configured; set {API_BASE_ENV} or run `meteo configure`. \
             Forecast requests will fail."
        );
    }

    AppContext::from_config(config).context("Failed to set up the weather service")
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_base = Text::new("Forecast API base URL:")
        .with_default(config.api_base.as_deref().unwrap_or(SUGGESTED_API_BASE))
        .prompt()?;

    let days = CustomType::<u8>::new("Forecast days:")
        .with_default(config.forecast_days())
        .with_validator(|days: &u8| {
            Ok(if (1..=MAX_FORECAST_DAYS).contains(days) {
                Validation::Valid
            } else {
                Validation::Invalid(format!("Choose between 1 and {MAX_FORECAST_DAYS} days").into())
            })
        })
        .prompt()?;

    let count = CustomType::<u32>::new("Search results to list:")
        .with_default(config.search_count())
        .prompt()?;

    let current_location = config
        .default_location
        .map(|c| format!("{}, {}", c.latitude, c.longitude))
        .unwrap_or_default();
    let location = Text::new("Default location (latitude, longitude), blank for none:")
        .with_initial_value(&current_location)
        .with_validator(|input: &str| {
            Ok(if input.trim().is_empty() || parse_coordinates(input).is_some() {
                Validation::Valid
            } else {
                Validation::Invalid("Expected e.g. 52.52, 13.41".into())
            })
        })
        .prompt()?;

    config.api_base = Some(api_base.trim().to_string());
    config.forecast_days = Some(days);
    config.search_count = Some(count);
    config.default_location = parse_coordinates(&location);
    config.save_to(&path)?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// "lat, lon" with both values in range.
fn parse_coordinates(input: &str) -> Option<Coordinates> {
    let (lat, lon) = input.split_once(',')?;
    let latitude: f64 = lat.trim().parse().ok()?;
    let longitude: f64 = lon.trim().parse().ok()?;
    ((-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude))
        .then(|| Coordinates::new(latitude, longitude))
}

async fn search(app: &AppContext, query: &str) -> anyhow::Result<()> {
    let results = run_search(app, query).await?;
    for place in &results {
        println!("{}", render::place_line(place));
    }
    Ok(())
}

async fn pick(app: &AppContext, query: &str, hourly: bool) -> anyhow::Result<()> {
    let results = run_search(app, query).await?;

    let options = results.into_iter().map(PlaceOption).collect();
    let PlaceOption(place) = Select::new("Choose a place:", options).prompt()?;
    info!(place = %place.label(), "place selected");

    let weather = app.weather();
    weather.fetch_weather(place.coordinates()).await;

    println!("{}, {}", place.name, place.country);
    print_weather(app, &weather.snapshot(), hourly)
}

/// Runs a search and returns its matches, failing when there are none.
async fn run_search(app: &AppContext, query: &str) -> anyhow::Result<Vec<GeocodingResult>> {
    let search = app.location_search();

    if search.search(query).await == Completion::Skipped {
        bail!("Search needs at least {MIN_QUERY_CHARS} characters, got '{query}'.");
    }

    let view = search.snapshot();
    if let Some(err) = view.error {
        return Err(failure(app, err));
    }

    let results = view.data.unwrap_or_default();
    if results.is_empty() {
        bail!("No places match '{query}'.");
    }
    Ok(results)
}

fn print_weather(app: &AppContext, view: &WeatherView, hourly: bool) -> anyhow::Result<()> {
    if let Some(err) = &view.error {
        return Err(failure(app, err.clone()));
    }

    let weather = view
        .data
        .as_ref()
        .ok_or_else(|| anyhow!("No weather data was returned"))?;

    print!("{}", render::WeatherCard::new(weather, hourly));
    Ok(())
}

fn failure(app: &AppContext, err: SharedError) -> anyhow::Error {
    let hint = if err.is_not_found() {
        Some("Hint: run `meteo search <name>` to see which places are known.".to_string())
    } else if err.is_transport() && !app.config().has_api_base() {
        Some(format!(
            "Hint: set {API_BASE_ENV} (e.g. {SUGGESTED_API_BASE}) or run `meteo configure`."
        ))
    } else {
        None
    };

    let err = anyhow::Error::new(err);
    match hint {
        Some(hint) => err.context(hint),
        None => err,
    }
}

/// Select-prompt entry for one geocoding match.
struct PlaceOption(GeocodingResult);

impl fmt::Display for PlaceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::place_line(&self.0))
    }
}
