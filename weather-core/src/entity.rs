//! Read-only views over a coordinator's records.
//!
//! Entities hold no weather data. Every accessor reads through to the
//! coordinator, so values change as soon as a refresh installs new records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    attributes::{DeviceClass, SensorAttribute, get_attribute, is_valid_attribute, sensor_types},
    config::ConfigEntry,
    coordinator::Coordinator,
    model::{DEFAULT_MODE, FieldValue, ForecastRecord, WeatherProductType},
    units::{TEMP_CELSIUS, UnitSystem, display_unit},
};

pub const MANUFACTURER: &str = "here.com";

/// Weather condition and the HERE icon names mapped to it.
pub const CONDITION_CLASSES: &[(&str, &[&str])] = &[
    (
        "clear-night",
        &[
            "night_passing_clouds",
            "night_mostly_clear",
            "night_clear",
            "night_clearing_skies",
            "night_decreasing_cloudiness",
        ],
    ),
    (
        "cloudy",
        &[
            "cloudy",
            "mostly_cloudy",
            "overcast",
            "low_clouds",
            "more_clouds_than_sun",
            "broken_clouds",
            "night_broken_clouds",
            "night_mostly_cloudy",
        ],
    ),
    (
        "fog",
        &[
            "fog",
            "dense_fog",
            "light_fog",
            "early_fog",
            "early_fog_followed_by_sunny_skies",
            "ice_fog",
            "haze",
            "hazy_sunshine",
            "low_level_haze",
            "smoke",
            "night_haze",
            "night_smoke",
            "night_low_level_haze",
        ],
    ),
    ("hail", &["hail"]),
    (
        "lightning",
        &["thunderstorms", "tstorms", "tstorms_early", "tstorms_late", "night_tstorms"],
    ),
    (
        "lightning-rainy",
        &[
            "strong_thunderstorms",
            "severe_thunderstorms",
            "thundershowers",
            "isolated_tstorms",
            "isolated_tstorms_late",
            "scattered_tstorms",
            "scattered_tstorms_late",
            "widely_scattered_tstorms",
            "a_few_tstorms",
            "night_isolated_tstorms",
            "night_scattered_tstorms",
            "night_widely_scattered_tstorms",
            "night_a_few_tstorms",
        ],
    ),
    (
        "partlycloudy",
        &[
            "scattered_clouds",
            "partly_cloudy",
            "a_mixture_of_sun_and_clouds",
            "increasing_cloudiness",
            "breaks_of_sun_late",
            "afternoon_clouds",
            "morning_clouds",
            "partly_sunny",
            "high_level_clouds",
            "high_clouds",
            "decreasing_cloudiness",
            "clearing_skies",
            "night_scattered_clouds",
            "night_partly_cloudy",
            "night_high_level_clouds",
            "night_high_clouds",
            "night_afternoon_clouds",
            "night_morning_clouds",
        ],
    ),
    (
        "pouring",
        &[
            "heavy_rain",
            "heavy_rain_early",
            "heavy_rain_late",
            "lots_of_rain",
            "tons_of_rain",
            "flash_floods",
            "flood",
        ],
    ),
    (
        "rainy",
        &[
            "rain",
            "light_rain",
            "light_rain_early",
            "light_rain_late",
            "rain_early",
            "rain_late",
            "drizzle",
            "sprinkles",
            "sprinkles_early",
            "sprinkles_late",
            "showers",
            "showery",
            "showers_early",
            "showers_late",
            "numerous_showers",
            "rain_showers",
            "scattered_showers",
            "a_few_showers",
            "light_showers",
            "passing_showers",
            "night_scattered_showers",
            "night_a_few_showers",
            "night_light_showers",
            "night_passing_showers",
            "night_rain_showers",
            "night_sprinkles",
            "night_showers",
        ],
    ),
    (
        "snowy",
        &[
            "snow",
            "light_snow",
            "moderate_snow",
            "heavy_snow",
            "snow_early",
            "snow_late",
            "heavy_snow_early",
            "heavy_snow_late",
            "light_snow_early",
            "light_snow_late",
            "snow_showers",
            "light_snow_showers",
            "snow_showers_early",
            "snow_showers_late",
            "snow_flurries",
            "scattered_flurries",
            "flurries_early",
            "flurries_late",
            "snowstorm",
            "blizzard",
        ],
    ),
    (
        "snowy-rainy",
        &[
            "sleet",
            "freezing_rain",
            "light_freezing_rain",
            "icy_mix",
            "light_mixture_of_precip",
            "mixture_of_precip",
            "heavy_mixture_of_precip",
            "snow_rain_mix",
            "snow_changing_to_rain",
            "snow_changing_to_an_icy_mix",
            "an_icy_mix_changing_to_snow",
            "an_icy_mix_changing_to_rain",
            "rain_changing_to_snow",
            "rain_changing_to_an_icy_mix",
            "light_icy_mix_early",
            "icy_mix_early",
            "light_icy_mix_late",
            "icy_mix_late",
        ],
    ),
    (
        "sunny",
        &[
            "sunny",
            "clear",
            "mostly_sunny",
            "mostly_clear",
            "passing_clounds",
            "more_sun_than_clouds",
        ],
    ),
    ("windy", &["strong_wind", "windy", "breezy"]),
    (
        "exceptional",
        &["tornado", "tropical_storm", "hurricane", "sandstorm", "duststorm"],
    ),
];

/// Map a HERE icon name to a weather condition.
pub fn condition_for_icon(icon_name: &str) -> Option<&'static str> {
    CONDITION_CLASSES
        .iter()
        .find(|(_, icons)| icons.contains(&icon_name))
        .map(|(condition, _)| *condition)
}

fn compact_id(raw: String) -> String {
    raw.to_lowercase().split_whitespace().collect()
}

/// Service "device" grouping the entities of one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub entry_type: &'static str,
}

impl DeviceInfo {
    pub fn new(entry: &ConfigEntry, product: WeatherProductType) -> Self {
        Self {
            identifier: compact_id(format!("{}_{product}", entry.unique_id())),
            name: format!("{} {product}", entry.data.name),
            manufacturer: MANUFACTURER,
            entry_type: "service",
        }
    }
}

/// One attribute of one period exposed as a sensor.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub unique_id: String,
    pub name: String,
    pub product: WeatherProductType,
    pub attribute: &'static SensorAttribute,
    pub offset: usize,
    pub device_class: Option<DeviceClass>,
    pub unit_of_measurement: Option<&'static str>,
    pub enabled_by_default: bool,
    pub device_info: DeviceInfo,
}

impl Sensor {
    pub fn new(
        entry: &ConfigEntry,
        product: WeatherProductType,
        attribute: &'static SensorAttribute,
        offset: usize,
        units: UnitSystem,
    ) -> Self {
        let base_name = &entry.data.name;

        Self {
            unique_id: compact_id(format!(
                "{}_{product}_{}_{offset}",
                entry.unique_id(),
                attribute.suffix
            )),
            name: format!("{base_name} {product} {} {offset}", attribute.suffix),
            product,
            attribute,
            offset,
            device_class: attribute.device_class,
            unit_of_measurement: display_unit(units.is_metric(), attribute.unit),
            enabled_by_default: false,
            device_info: DeviceInfo::new(entry, product),
        }
    }

    /// Sensors for every attribute of `product` at period `offset`.
    pub fn all_for_product(
        entry: &ConfigEntry,
        product: WeatherProductType,
        offset: usize,
        units: UnitSystem,
    ) -> Vec<Sensor> {
        sensor_types(product)
            .iter()
            .map(|attribute| Sensor::new(entry, product, attribute, offset, units))
            .collect()
    }

    /// Current state, or `None` when the coordinator is unavailable or the
    /// value is absent.
    pub fn native_value(&self, coordinator: &Coordinator) -> Option<String> {
        if !coordinator.is_available() {
            return None;
        }
        let records = coordinator.data()?;
        get_attribute(records, self.attribute.name, self.offset)?.render()
    }
}

/// One period of a weather entity's forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Forecast {
    pub datetime: Option<DateTime<Utc>>,
    pub condition: Option<&'static str>,
    pub precipitation_probability: Option<i64>,
    pub precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub templow: Option<f64>,
    pub wind_bearing: Option<i64>,
    pub wind_speed: Option<f64>,
}

/// Summary view of one non-astronomy product.
#[derive(Debug, Clone)]
pub struct WeatherEntity {
    pub unique_id: String,
    pub name: String,
    pub product: WeatherProductType,
    pub temperature_unit: &'static str,
    pub enabled_by_default: bool,
    pub device_info: DeviceInfo,
}

impl WeatherEntity {
    /// `None` for the astronomy product, which has no weather to show.
    pub fn new(entry: &ConfigEntry, product: WeatherProductType) -> Option<Self> {
        if product == WeatherProductType::ForecastAstronomy {
            return None;
        }

        let unique_id = compact_id(format!("{}_{product}", entry.unique_id()));
        let name = format!("{} {product}", entry.data.name);

        Some(Self {
            device_info: DeviceInfo {
                identifier: unique_id.clone(),
                name: name.clone(),
                manufacturer: MANUFACTURER,
                entry_type: "service",
            },
            unique_id,
            name,
            product,
            temperature_unit: TEMP_CELSIUS,
            enabled_by_default: product == DEFAULT_MODE,
        })
    }

    fn records<'a>(&self, coordinator: &'a Coordinator) -> Option<&'a [ForecastRecord]> {
        if coordinator.is_available() { coordinator.data() } else { None }
    }

    pub fn condition(&self, coordinator: &Coordinator) -> Option<&'static str> {
        condition_at(self.records(coordinator)?, 0)
    }

    pub fn temperature(&self, coordinator: &Coordinator) -> Option<f64> {
        temperature_at(self.records(coordinator)?, self.product, 0)
    }

    pub fn pressure(&self, coordinator: &Coordinator) -> Option<f64> {
        pressure_at(self.records(coordinator)?, self.product, 0)
    }

    pub fn wind_speed(&self, coordinator: &Coordinator) -> Option<f64> {
        number_at(self.records(coordinator)?, "windSpeed", 0)
    }

    pub fn wind_bearing(&self, coordinator: &Coordinator) -> Option<i64> {
        get_attribute(self.records(coordinator)?, "windDirection", 0)?.as_i64()
    }

    pub fn visibility(&self, coordinator: &Coordinator) -> Option<f64> {
        if !is_valid_attribute(self.product, "visibility") {
            return None;
        }
        number_at(self.records(coordinator)?, "visibility", 0)
    }

    /// One entry per cached period.
    pub fn forecast(&self, coordinator: &Coordinator) -> Vec<Forecast> {
        let Some(records) = self.records(coordinator) else {
            return Vec::new();
        };

        (0..records.len())
            .map(|offset| Forecast {
                datetime: get_attribute(records, "time", offset)
                    .and_then(FieldValue::as_timestamp),
                condition: condition_at(records, offset),
                precipitation_probability: precipitation_probability_at(
                    records,
                    self.product,
                    offset,
                ),
                precipitation: precipitation_at(records, offset),
                pressure: pressure_at(records, self.product, offset),
                temperature: number_at(records, "highTemperature", offset)
                    .or_else(|| temperature_at(records, self.product, offset)),
                templow: number_at(records, "lowTemperature", offset)
                    .or_else(|| temperature_at(records, self.product, offset)),
                wind_bearing: get_attribute(records, "windDirection", offset)
                    .and_then(FieldValue::as_i64),
                wind_speed: number_at(records, "windSpeed", offset),
            })
            .collect()
    }
}

fn number_at(records: &[ForecastRecord], name: &str, offset: usize) -> Option<f64> {
    get_attribute(records, name, offset)?.as_f64()
}

fn condition_at(records: &[ForecastRecord], offset: usize) -> Option<&'static str> {
    let icon = get_attribute(records, "iconName", offset)?.as_str()?;
    condition_for_icon(icon)
}

/// The simple daily product has no plain temperature; its high stands in.
fn temperature_at(
    records: &[ForecastRecord],
    product: WeatherProductType,
    offset: usize,
) -> Option<f64> {
    let name = match product {
        WeatherProductType::Forecast7DaysSimple => "highTemperature",
        _ => "temperature",
    };
    number_at(records, name, offset)
}

fn pressure_at(records: &[ForecastRecord], product: WeatherProductType, offset: usize) -> Option<f64> {
    if !is_valid_attribute(product, "barometerPressure") {
        return None;
    }
    number_at(records, "barometerPressure", offset)
}

fn precipitation_probability_at(
    records: &[ForecastRecord],
    product: WeatherProductType,
    offset: usize,
) -> Option<i64> {
    if !is_valid_attribute(product, "precipitationProbability") {
        return None;
    }
    get_attribute(records, "precipitationProbability", offset)?.as_i64()
}

/// Rain plus snow, only when both are reported.
fn precipitation_at(records: &[ForecastRecord], offset: usize) -> Option<f64> {
    let rain = number_at(records, "rainFall", offset)?;
    let snow = number_at(records, "snowFall", offset)?;
    Some(rain + snow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attributes::sensor_attribute, config::EntryData};

    fn entry() -> ConfigEntry {
        ConfigEntry::new(EntryData {
            api_key: "test".into(),
            name: "here_weather".into(),
            latitude: 40.79962,
            longitude: -73.970314,
        })
    }

    #[test]
    fn sensor_identity() {
        let attribute =
            sensor_attribute(WeatherProductType::Forecast7DaysSimple, "windSpeed").unwrap();
        let sensor = Sensor::new(
            &entry(),
            WeatherProductType::Forecast7DaysSimple,
            attribute,
            0,
            UnitSystem::Metric,
        );

        assert_eq!(sensor.unique_id, "40.79962_-73.970314_forecast_7days_simple_windspeed_0");
        assert_eq!(sensor.name, "here_weather forecast_7days_simple Wind Speed 0");
        assert_eq!(sensor.unit_of_measurement, Some("km/h"));
        assert!(!sensor.enabled_by_default);
        assert_eq!(sensor.device_info.identifier, "40.79962_-73.970314_forecast_7days_simple");
        assert_eq!(sensor.device_info.manufacturer, "here.com");
    }

    #[test]
    fn imperial_sensor_units() {
        let attribute =
            sensor_attribute(WeatherProductType::Forecast7DaysSimple, "windSpeed").unwrap();
        let sensor = Sensor::new(
            &entry(),
            WeatherProductType::Forecast7DaysSimple,
            attribute,
            0,
            UnitSystem::Imperial,
        );
        assert_eq!(sensor.unit_of_measurement, Some("mph"));
    }

    #[test]
    fn astronomy_time_sensor_id() {
        let attribute = sensor_attribute(WeatherProductType::ForecastAstronomy, "time").unwrap();
        let sensor = Sensor::new(
            &entry(),
            WeatherProductType::ForecastAstronomy,
            attribute,
            0,
            UnitSystem::Metric,
        );
        assert_eq!(sensor.unique_id, "40.79962_-73.970314_forecast_astronomy_utctime_0");
        assert_eq!(sensor.device_class, Some(DeviceClass::Timestamp));
    }

    #[test]
    fn one_sensor_per_attribute() {
        let sensors = Sensor::all_for_product(
            &entry(),
            WeatherProductType::Observation,
            0,
            UnitSystem::Metric,
        );
        assert_eq!(sensors.len(), sensor_types(WeatherProductType::Observation).len());
    }

    #[test]
    fn weather_entities_skip_astronomy() {
        assert!(WeatherEntity::new(&entry(), WeatherProductType::ForecastAstronomy).is_none());

        let daily = WeatherEntity::new(&entry(), WeatherProductType::Forecast7DaysSimple).unwrap();
        assert_eq!(daily.unique_id, "40.79962_-73.970314_forecast_7days_simple");
        assert_eq!(daily.name, "here_weather forecast_7days_simple");
        assert!(daily.enabled_by_default);

        let hourly = WeatherEntity::new(&entry(), WeatherProductType::ForecastHourly).unwrap();
        assert!(!hourly.enabled_by_default);
    }

    #[test]
    fn icon_names_map_to_conditions() {
        assert_eq!(condition_for_icon("light_snow"), Some("snowy"));
        assert_eq!(condition_for_icon("night_clear"), Some("clear-night"));
        assert_eq!(condition_for_icon("tstorms"), Some("lightning"));
        assert_eq!(condition_for_icon("no_such_icon"), None);
    }

    #[test]
    fn precipitation_needs_rain_and_snow() {
        let mut record = ForecastRecord::new();
        record.insert("rainFall".into(), FieldValue::Text("0.25".into()));
        record.insert("snowFall".into(), FieldValue::Absent);
        let mut both = record.clone();
        both.insert("snowFall".into(), FieldValue::Text("1.00".into()));

        let records = vec![record, both];
        assert_eq!(precipitation_at(&records, 0), None);
        assert_eq!(precipitation_at(&records, 1), Some(1.25));
    }
}
