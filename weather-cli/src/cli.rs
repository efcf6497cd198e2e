use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use here_weather_core::{
    Config, ConfigEntry, Coordinator, HereProvider, Sensor, UnitSystem, WeatherEntity,
    WeatherProductType, WeatherProvider, config::validate_user_input, error::FormError,
    provider::provider_from_entry, setup_entry,
};
use tokio::{task::JoinSet, time::MissedTickBehavior};
use tracing::{info, warn};

use crate::{output, prompt};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "here-weather", version, about = "HERE weather sensors on the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a location: API key, name and coordinates.
    Configure,

    /// Change language and refresh interval of a location.
    Options {
        /// Location id (`<latitude>_<longitude>`); defaults to the default location.
        #[arg(long)]
        location: Option<String>,
    },

    /// Switch between metric and imperial units.
    Units {
        /// "metric" or "imperial".
        system: String,
    },

    /// List configured locations.
    List,

    /// Remove a configured location.
    Remove {
        location: String,
    },

    /// Print every sensor of one product for one forecast period.
    Show {
        /// Product, e.g. "observation" or "forecast_astronomy".
        #[arg(long, default_value = "forecast_7days_simple")]
        product: String,

        /// Forecast period; 0 is the first one.
        #[arg(long, default_value_t = 0)]
        offset: usize,

        #[arg(long)]
        location: Option<String>,
    },

    /// Print the weather summary and forecast of one product.
    Forecast {
        #[arg(long, default_value = "forecast_7days_simple")]
        product: String,

        #[arg(long)]
        location: Option<String>,
    },

    /// Keep every product refreshed until interrupted.
    Watch {
        #[arg(long)]
        location: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config).await?,
            Command::Options { location } => {
                let entry = select_entry(&config, location.as_deref())?.clone();
                let options = prompt::options(&entry.options)?;
                config.update_options(&entry.unique_id(), options)?;
                config.save()?;
                println!("Options updated for {}.", entry.data.name);
            }
            Command::Units { system } => {
                config.unit_system = match system.to_lowercase().as_str() {
                    "metric" => UnitSystem::Metric,
                    "imperial" => UnitSystem::Imperial,
                    _ => return Err(anyhow!("Unknown unit system '{system}'. Use metric or imperial.")),
                };
                config.save()?;
                println!("Unit system set to {}.", config.unit_system.as_str());
            }
            Command::List => output::print_entries(&config),
            Command::Remove { location } => {
                let removed = config
                    .remove_entry(&location)
                    .ok_or_else(|| anyhow!("No location configured with id '{location}'"))?;
                config.save()?;
                println!("Removed {}.", removed.data.name);
            }
            Command::Show { product, offset, location } => {
                let product = WeatherProductType::try_from(product.as_str())?;
                let entry = select_entry(&config, location.as_deref())?;
                let coordinator = refreshed(entry, product, config.unit_system).await?;

                let sensors = Sensor::all_for_product(entry, product, offset, config.unit_system);
                output::print_sensors(&sensors, &coordinator);
            }
            Command::Forecast { product, location } => {
                let product = WeatherProductType::try_from(product.as_str())?;
                let entry = select_entry(&config, location.as_deref())?;
                let weather = WeatherEntity::new(entry, product).ok_or_else(|| {
                    anyhow!("{product} has no weather summary; use `show --product {product}`")
                })?;
                let coordinator = refreshed(entry, product, config.unit_system).await?;

                output::print_weather(&weather, &coordinator, config.unit_system);
            }
            Command::Watch { location } => {
                let entry = select_entry(&config, location.as_deref())?.clone();
                watch(entry, config.unit_system).await?;
            }
        }

        Ok(())
    }
}

fn select_entry<'a>(config: &'a Config, location: Option<&str>) -> anyhow::Result<&'a ConfigEntry> {
    match location {
        Some(id) => config.entry(id),
        None => config.default_entry(),
    }
}

fn provider_for(entry: &ConfigEntry) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    Ok(Arc::from(provider_from_entry(&entry.data)?))
}

async fn refreshed(
    entry: &ConfigEntry,
    product: WeatherProductType,
    units: UnitSystem,
) -> anyhow::Result<Coordinator> {
    let mut coordinator = Coordinator::for_entry(provider_for(entry)?, entry, product, units);
    coordinator.refresh().await?;
    Ok(coordinator)
}

async fn configure(config: &mut Config) -> anyhow::Result<()> {
    let mut previous = None;

    loop {
        let data = prompt::entry_data(previous.as_ref())?;

        if config.entries.contains_key(&data.unique_id()) {
            return Err(FormError::AlreadyConfigured.into());
        }

        let provider = HereProvider::new(data.api_key.clone());
        match validate_user_input(&provider, &data, config.unit_system).await {
            Ok(()) => {
                let id = config.add_entry(data)?;
                config.save()?;
                println!("Configured location {id}.");
                return Ok(());
            }
            Err(err @ FormError::AlreadyConfigured) => return Err(err.into()),
            Err(err) => {
                println!("{err} ({})", err.key());
                if !prompt::retry()? {
                    return Err(err.into());
                }
                previous = Some(data);
            }
        }
    }
}

async fn watch(entry: ConfigEntry, units: UnitSystem) -> anyhow::Result<()> {
    let provider = provider_for(&entry)?;
    let coordinators = setup_entry(provider, &entry, units)
        .await
        .context("Could not set up location")?;

    let mut tasks = JoinSet::new();
    for coordinator in coordinators {
        let entry = entry.clone();
        tasks.spawn(poll(coordinator, entry, units));
    }

    info!(name = %entry.data.name, "Watching HERE weather; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    tasks.abort_all();

    Ok(())
}

async fn poll(mut coordinator: Coordinator, entry: ConfigEntry, units: UnitSystem) {
    let product = coordinator.product();
    let weather = WeatherEntity::new(&entry, product);
    let sensors = Sensor::all_for_product(&entry, product, 0, units);

    let mut interval = tokio::time::interval(coordinator.update_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately and the coordinator is already primed.
    interval.tick().await;

    loop {
        match &weather {
            Some(weather) => output::print_weather_line(weather, &coordinator, units),
            None => output::print_sensor_line(product, &sensors, &coordinator),
        }

        interval.tick().await;
        if let Err(err) = coordinator.refresh().await {
            warn!(%product, error = %err, "Refresh failed; entities unavailable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_defaults_to_the_daily_product() {
        let cli = Cli::try_parse_from(["here-weather", "show"]).unwrap();
        match cli.command {
            Command::Show { product, offset, location } => {
                assert_eq!(product, "forecast_7days_simple");
                assert_eq!(offset, 0);
                assert!(location.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
