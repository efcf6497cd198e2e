use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::units::UnitSystem;

/// Weather product offered by the HERE API.
///
/// Every product has its own payload layout and its own set of meaningful
/// attributes, so each one gets an independent coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherProductType {
    Observation,
    ForecastHourly,
    #[serde(rename = "forecast_7days")]
    Forecast7Days,
    #[serde(rename = "forecast_7days_simple")]
    Forecast7DaysSimple,
    ForecastAstronomy,
}

/// Product whose weather entity is enabled by default.
pub const DEFAULT_MODE: WeatherProductType = WeatherProductType::Forecast7DaysSimple;

impl WeatherProductType {
    /// Name used in identifiers, entity names and on the command line.
    pub fn mode(&self) -> &'static str {
        match self {
            WeatherProductType::Observation => "observation",
            WeatherProductType::ForecastHourly => "forecast_hourly",
            WeatherProductType::Forecast7Days => "forecast_7days",
            WeatherProductType::Forecast7DaysSimple => "forecast_7days_simple",
            WeatherProductType::ForecastAstronomy => "forecast_astronomy",
        }
    }

    /// Value of the `products` query parameter.
    pub fn api_name(&self) -> &'static str {
        match self {
            WeatherProductType::Observation => "observation",
            WeatherProductType::ForecastHourly => "forecastHourly",
            WeatherProductType::Forecast7Days => "forecast7days",
            WeatherProductType::Forecast7DaysSimple => "forecast7daysSimple",
            WeatherProductType::ForecastAstronomy => "forecastAstronomy",
        }
    }

    pub const fn all() -> &'static [WeatherProductType] {
        &[
            WeatherProductType::Observation,
            WeatherProductType::ForecastHourly,
            WeatherProductType::Forecast7Days,
            WeatherProductType::Forecast7DaysSimple,
            WeatherProductType::ForecastAstronomy,
        ]
    }
}

impl std::fmt::Display for WeatherProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mode())
    }
}

impl TryFrom<&str> for WeatherProductType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        WeatherProductType::all()
            .iter()
            .copied()
            .find(|product| product.mode() == lower || product.api_name().to_lowercase() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown weather product '{value}'. Supported products: observation, \
                     forecast_hourly, forecast_7days, forecast_7days_simple, forecast_astronomy."
                )
            })
    }
}

/// Languages the HERE API can localize descriptions into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "de-DE")]
    German,
    #[serde(rename = "fr-FR")]
    French,
    #[serde(rename = "es-ES")]
    Spanish,
    #[serde(rename = "it-IT")]
    Italian,
    #[serde(rename = "nl-NL")]
    Dutch,
    #[serde(rename = "pl-PL")]
    Polish,
    #[serde(rename = "pt-PT")]
    Portuguese,
    #[serde(rename = "sv-SE")]
    Swedish,
    #[serde(rename = "da-DK")]
    Danish,
    #[serde(rename = "fi-FI")]
    Finnish,
    #[serde(rename = "nb-NO")]
    Norwegian,
    #[serde(rename = "cs-CZ")]
    Czech,
    #[serde(rename = "tr-TR")]
    Turkish,
    #[serde(rename = "ru-RU")]
    Russian,
    #[serde(rename = "ja-JP")]
    Japanese,
    #[serde(rename = "zh-CN")]
    Chinese,
}

impl Language {
    pub const fn all() -> &'static [Language] {
        &[
            Language::English,
            Language::German,
            Language::French,
            Language::Spanish,
            Language::Italian,
            Language::Dutch,
            Language::Polish,
            Language::Portuguese,
            Language::Swedish,
            Language::Danish,
            Language::Finnish,
            Language::Norwegian,
            Language::Czech,
            Language::Turkish,
            Language::Russian,
            Language::Japanese,
            Language::Chinese,
        ]
    }

    /// BCP 47 tag sent as the `lang` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::German => "de-DE",
            Language::French => "fr-FR",
            Language::Spanish => "es-ES",
            Language::Italian => "it-IT",
            Language::Dutch => "nl-NL",
            Language::Polish => "pl-PL",
            Language::Portuguese => "pt-PT",
            Language::Swedish => "sv-SE",
            Language::Danish => "da-DK",
            Language::Finnish => "fi-FI",
            Language::Norwegian => "nb-NO",
            Language::Czech => "cs-CZ",
            Language::Turkish => "tr-TR",
            Language::Russian => "ru-RU",
            Language::Japanese => "ja-JP",
            Language::Chinese => "zh-CN",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        Language::all()
            .iter()
            .copied()
            .find(|language| language.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?} ({})", self.code())
    }
}

/// One fetch for one product at one set of coordinates.
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub product: WeatherProductType,
    pub language: Language,
    pub units: UnitSystem,
}

/// A single normalized attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Missing, null, the provider's `*` sentinel, or an unparsable time.
    Absent,
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// Nested structure passed through untouched.
    Json(Value),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Numeric view; numeric-looking strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            FieldValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// String state as shown to users. `None` for absent values.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Timestamp(ts) => Some(ts.to_rfc3339_opts(SecondsFormat::Secs, false)),
            FieldValue::Json(v) => Some(v.to_string()),
        }
    }
}

/// One forecast period (or one observation) keyed by attribute name.
pub type ForecastRecord = BTreeMap<String, FieldValue>;
