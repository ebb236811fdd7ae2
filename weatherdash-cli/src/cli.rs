use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use weatherdash_core::{
    Config, ConfiguredLocation, Coordinates, Dashboard, DashboardOptions, DisplayUnit,
    FavoritesError, FavoritesRegistry, FileStore, ForecastClient, GeolocationProvider,
    WeatherView, client_from_config, region::BuiltinRegions,
};

use crate::{input, terminal};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive dashboard with auto-refresh (the default).
    Dashboard(DashboardArgs),

    /// Print current conditions once and exit.
    Show {
        /// City name; defaults to the configured default city.
        city: Option<String>,

        /// Use the configured location instead of a city.
        #[arg(long, conflicts_with = "city")]
        here: bool,

        /// Show temperatures in °F.
        #[arg(long)]
        fahrenheit: bool,
    },

    /// Manage favorite cities.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Configure the API key, default city and location.
    Configure,
}

#[derive(Debug, Default, Args)]
pub struct DashboardArgs {
    /// City to open with instead of the configured default.
    #[arg(long)]
    city: Option<String>,

    /// Start with auto-refresh paused.
    #[arg(long)]
    no_auto_refresh: bool,

    /// Start with temperatures in °F.
    #[arg(long)]
    fahrenheit: bool,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List favorites (the default).
    List,
    /// Add a city.
    Add { city: String },
    /// Remove the favorite at a 1-based position.
    Remove {
        position: usize,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Dashboard(DashboardArgs::default())) {
            Command::Dashboard(args) => run_dashboard(args).await,
            Command::Show {
                city,
                here,
                fahrenheit,
            } => show(city, here, fahrenheit).await,
            Command::Favorites { action } => favorites(action.unwrap_or(FavoritesAction::List)),
            Command::Configure => configure(),
        }
    }
}

async fn run_dashboard(args: DashboardArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client: Arc<dyn ForecastClient> = Arc::from(client_from_config(&config)?);
    let geolocation = Arc::new(ConfiguredLocation::from_config(&config.location));
    let favorites = open_favorites()?;

    let mut options = DashboardOptions::from_config(&config);
    if let Some(city) = args.city {
        options.initial_city = Some(city);
    }
    if args.no_auto_refresh {
        options.auto_refresh = false;
    }
    if args.fahrenheit {
        options.unit = DisplayUnit::Fahrenheit;
    }

    let mut dashboard = Dashboard::new(
        client,
        geolocation,
        favorites,
        terminal::TerminalPresenter::new(),
        options.stale_fetches,
    );

    println!("{}", input::HELP);
    let submissions = input::spawn_reader();
    dashboard.open(&options);
    dashboard.run(submissions).await;

    Ok(())
}

fn open_favorites() -> anyhow::Result<FavoritesRegistry<FileStore>> {
    let store = FileStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "opening favorites store");
    Ok(FavoritesRegistry::load(store))
}

async fn show(city: Option<String>, here: bool, fahrenheit: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = client_from_config(&config)?;

    let snapshot = if here {
        let coords = ConfiguredLocation::from_config(&config.location)
            .current_position()
            .await?;
        client.fetch_by_coordinates(coords).await
    } else {
        let city = city.unwrap_or_else(|| config.default_city.clone());
        client.fetch_by_city(&city).await
    }
    .map_err(|_| anyhow!("City not found! Please check the spelling and try again."))?;

    let unit = if fahrenheit {
        DisplayUnit::Fahrenheit
    } else {
        DisplayUnit::Celsius
    };
    terminal::print_weather(&WeatherView::new(&snapshot, unit, &BuiltinRegions));

    Ok(())
}

fn favorites(action: FavoritesAction) -> anyhow::Result<()> {
    let mut registry = open_favorites()?;

    match action {
        FavoritesAction::List => {}
        FavoritesAction::Add { city } => match registry.add(city.trim()) {
            Ok(()) => println!("Added {}.", city.trim()),
            Err(FavoritesError::DuplicateCity(city)) => println!("{city} is already a favorite."),
            Err(e) => return Err(e.into()),
        },
        FavoritesAction::Remove { position, yes } => {
            let index = position
                .checked_sub(1)
                .ok_or_else(|| anyhow!("Positions start at 1"))?;

            let removed = registry.remove(index, |city| {
                yes || Confirm::new(&format!("Remove {city} from favorites?"))
                    .with_default(false)
                    .prompt()
                    .unwrap_or(false)
            })?;
            if let Some(city) = removed {
                println!("Removed {city}.");
            }
        }
    }

    terminal::print_favorites(registry.list());
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeather API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Configuration cancelled")?;
    config.set_api_key(api_key.trim().to_string());

    config.default_city = Text::new("Default city:")
        .with_initial_value(&config.default_city)
        .prompt()
        .context("Configuration cancelled")?
        .trim()
        .to_string();

    config.auto_refresh = Confirm::new("Refresh automatically every 60 seconds?")
        .with_default(config.auto_refresh)
        .prompt()
        .context("Configuration cancelled")?;

    config.location.enabled = Confirm::new("Allow `here` to use a fixed location?")
        .with_default(config.location.enabled)
        .prompt()
        .context("Configuration cancelled")?;

    if config.location.enabled {
        let latitude = coordinate_prompt("Latitude:", config.location.latitude)?;
        let longitude = coordinate_prompt("Longitude:", config.location.longitude)?;

        let coords = Coordinates::new(latitude, longitude)?;
        config.location.latitude = Some(coords.latitude());
        config.location.longitude = Some(coords.longitude());
    }

    config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

fn coordinate_prompt(message: &str, current: Option<f64>) -> anyhow::Result<f64> {
    let mut prompt = CustomType::<f64>::new(message).with_error_message("Please type a number");
    if let Some(value) = current {
        prompt = prompt.with_default(value);
    }
    prompt.prompt().context("Configuration cancelled")
}
