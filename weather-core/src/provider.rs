use crate::{
    config::EntryData, error::HereError, model::WeatherRequest, provider::here::HereProvider,
};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

pub mod here;

/// Source of raw weather payloads.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch the report for one product at one location, unparsed.
    async fn weather_for_coordinates(&self, request: &WeatherRequest) -> Result<Value, HereError>;
}

/// Construct the HERE client for a configured location.
pub fn provider_from_entry(entry: &EntryData) -> anyhow::Result<Box<dyn WeatherProvider>> {
    if entry.api_key.trim().is_empty() {
        return Err(anyhow::anyhow!(
            "No API key configured for '{}'.\n\
             Hint: run `here-weather configure` and enter your HERE API key.",
            entry.name
        ));
    }

    Ok(Box::new(HereProvider::new(entry.api_key.clone())))
}
