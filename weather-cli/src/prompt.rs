//! Interactive forms built on `inquire`.

use here_weather_core::{EntryData, EntryOptions, Language};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Select, Text};

const DEFAULT_NAME: &str = "here_weather";

/// Ask for a new location, pre-filled with the last attempt if there was one.
pub fn entry_data(previous: Option<&EntryData>) -> anyhow::Result<EntryData> {
    let mut key_prompt = Password::new("HERE API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked);
    if previous.is_some() {
        key_prompt = key_prompt.with_help_message("Leave empty to keep the previous key");
    }
    let mut api_key = key_prompt.prompt()?;
    if let Some(previous) = previous.filter(|_| api_key.trim().is_empty()) {
        api_key = previous.api_key.clone();
    }

    let name = Text::new("Name:")
        .with_default(previous.map_or(DEFAULT_NAME, |p| p.name.as_str()))
        .prompt()?;

    loop {
        let mut latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number, e.g. 40.79962");
        let mut longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number, e.g. -73.970314");
        if let Some(previous) = previous {
            latitude = latitude.with_default(previous.latitude);
            longitude = longitude.with_default(previous.longitude);
        }

        let data = EntryData {
            api_key: api_key.trim().to_string(),
            name: name.clone(),
            latitude: latitude.prompt()?,
            longitude: longitude.prompt()?,
        };

        match data.validate_coordinates() {
            Ok(()) => return Ok(data),
            Err(err) => println!("{err}"),
        }
    }
}

/// Ask for new options, starting from the current ones.
pub fn options(current: &EntryOptions) -> anyhow::Result<EntryOptions> {
    let languages = Language::all().to_vec();
    let cursor = languages
        .iter()
        .position(|language| *language == current.language)
        .unwrap_or_default();

    let language = Select::new("Language:", languages)
        .with_starting_cursor(cursor)
        .prompt()?;

    let scan_interval = CustomType::<u64>::new("Refresh interval (seconds):")
        .with_default(current.scan_interval)
        .with_error_message("Please type a whole number of seconds")
        .prompt()?;

    Ok(EntryOptions { language, scan_interval: scan_interval.max(1) })
}

pub fn retry() -> anyhow::Result<bool> {
    Ok(Confirm::new("Try again?").with_default(true).prompt()?)
}
