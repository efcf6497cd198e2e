//! Static sensor metadata per product and the record accessor.

use crate::{
    model::{FieldValue, ForecastRecord, WeatherProductType},
    units::{
        DEGREE, LENGTH_CENTIMETERS, LENGTH_KILOMETERS, PERCENTAGE, PRESSURE_MBAR,
        SPEED_KILOMETERS_PER_HOUR, TEMP_CELSIUS,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Temperature,
    Humidity,
    Pressure,
    Timestamp,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Temperature => "temperature",
            DeviceClass::Humidity => "humidity",
            DeviceClass::Pressure => "pressure",
            DeviceClass::Timestamp => "timestamp",
        }
    }
}

/// Display metadata of one attribute. Units are the metric ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAttribute {
    pub name: &'static str,
    pub suffix: &'static str,
    pub device_class: Option<DeviceClass>,
    pub unit: Option<&'static str>,
}

const fn attr(
    name: &'static str,
    suffix: &'static str,
    device_class: Option<DeviceClass>,
    unit: Option<&'static str>,
) -> SensorAttribute {
    SensorAttribute { name, suffix, device_class, unit }
}

const fn text(name: &'static str, suffix: &'static str) -> SensorAttribute {
    attr(name, suffix, None, None)
}

const fn temperature(name: &'static str, suffix: &'static str) -> SensorAttribute {
    attr(name, suffix, Some(DeviceClass::Temperature), Some(TEMP_CELSIUS))
}

const fn timestamp(name: &'static str, suffix: &'static str) -> SensorAttribute {
    attr(name, suffix, Some(DeviceClass::Timestamp), None)
}

const HUMIDITY: SensorAttribute =
    attr("humidity", "Humidity", Some(DeviceClass::Humidity), Some(PERCENTAGE));
const PRESSURE: SensorAttribute = attr(
    "barometerPressure",
    "Barometer Pressure",
    Some(DeviceClass::Pressure),
    Some(PRESSURE_MBAR),
);
const WIND_SPEED: SensorAttribute =
    attr("windSpeed", "Wind Speed", None, Some(SPEED_KILOMETERS_PER_HOUR));
const WIND_DIRECTION: SensorAttribute = attr("windDirection", "Wind Direction", None, Some(DEGREE));
const VISIBILITY: SensorAttribute = attr("visibility", "Visibility", None, Some(LENGTH_KILOMETERS));
const PRECIPITATION_PROBABILITY: SensorAttribute = attr(
    "precipitationProbability",
    "Precipitation Probability",
    None,
    Some(PERCENTAGE),
);
const RAIN_FALL: SensorAttribute = attr("rainFall", "Rain Fall", None, Some(LENGTH_CENTIMETERS));
const SNOW_FALL: SensorAttribute = attr("snowFall", "Snow Fall", None, Some(LENGTH_CENTIMETERS));
const TIME: SensorAttribute = timestamp("time", "UTC Time");

const OBSERVATION: &[SensorAttribute] = &[
    text("daylight", "Daylight"),
    text("description", "Description"),
    text("skyInfo", "Sky Info"),
    text("skyDescription", "Sky Description"),
    temperature("temperature", "Temperature"),
    text("temperatureDesc", "Temperature Description"),
    temperature("comfort", "Comfort"),
    temperature("highTemperature", "High Temperature"),
    temperature("lowTemperature", "Low Temperature"),
    HUMIDITY,
    temperature("dewPoint", "Dew Point"),
    attr("precipitation1H", "Precipitation 1h", None, Some(LENGTH_CENTIMETERS)),
    attr("precipitation3H", "Precipitation 3h", None, Some(LENGTH_CENTIMETERS)),
    attr("precipitation6H", "Precipitation 6h", None, Some(LENGTH_CENTIMETERS)),
    attr("precipitation12H", "Precipitation 12h", None, Some(LENGTH_CENTIMETERS)),
    attr("precipitation24H", "Precipitation 24h", None, Some(LENGTH_CENTIMETERS)),
    text("precipitationDesc", "Precipitation Description"),
    text("airInfo", "Air Info"),
    text("airDescription", "Air Description"),
    WIND_SPEED,
    WIND_DIRECTION,
    text("windDesc", "Wind Description"),
    text("windDescShort", "Wind Description Short"),
    PRESSURE,
    text("barometerTrend", "Barometer Trend"),
    VISIBILITY,
    attr("snowCover", "Snow Cover", None, Some(LENGTH_CENTIMETERS)),
    text("iconName", "Icon Name"),
    text("iconLink", "Icon Link"),
    attr("ageMinutes", "Age Minutes", None, Some("min")),
    text("activeAlerts", "Active Alerts"),
    TIME,
];

const FORECAST_HOURLY: &[SensorAttribute] = &[
    text("daylight", "Daylight"),
    text("description", "Description"),
    text("skyInfo", "Sky Info"),
    text("skyDescription", "Sky Description"),
    temperature("temperature", "Temperature"),
    text("temperatureDesc", "Temperature Description"),
    temperature("comfort", "Comfort"),
    HUMIDITY,
    temperature("dewPoint", "Dew Point"),
    PRECIPITATION_PROBABILITY,
    text("precipitationDesc", "Precipitation Description"),
    RAIN_FALL,
    SNOW_FALL,
    text("airInfo", "Air Info"),
    text("airDescription", "Air Description"),
    WIND_SPEED,
    WIND_DIRECTION,
    text("windDesc", "Wind Description"),
    text("windDescShort", "Wind Description Short"),
    PRESSURE,
    VISIBILITY,
    text("iconName", "Icon Name"),
    text("dayOfWeek", "Day of Week"),
    text("weekday", "Week Day"),
    TIME,
];

const FORECAST_7DAYS: &[SensorAttribute] = &[
    text("daySegment", "Day Segment"),
    text("description", "Description"),
    text("skyInfo", "Sky Info"),
    text("skyDescription", "Sky Description"),
    temperature("temperature", "Temperature"),
    text("temperatureDesc", "Temperature Description"),
    temperature("comfort", "Comfort"),
    HUMIDITY,
    temperature("dewPoint", "Dew Point"),
    PRECIPITATION_PROBABILITY,
    text("precipitationDesc", "Precipitation Description"),
    RAIN_FALL,
    SNOW_FALL,
    text("airInfo", "Air Info"),
    text("airDescription", "Air Description"),
    WIND_SPEED,
    WIND_DIRECTION,
    text("windDesc", "Wind Description"),
    text("windDescShort", "Wind Description Short"),
    text("beaufortScale", "Beaufort Scale"),
    text("beaufortDescription", "Beaufort Description"),
    PRESSURE,
    VISIBILITY,
    text("iconName", "Icon Name"),
    text("dayOfWeek", "Day of Week"),
    text("weekday", "Week Day"),
    TIME,
];

const FORECAST_7DAYS_SIMPLE: &[SensorAttribute] = &[
    text("description", "Description"),
    text("skyInfo", "Sky Info"),
    text("skyDescription", "Sky Description"),
    text("temperatureDesc", "Temperature Description"),
    temperature("comfort", "Comfort"),
    temperature("highTemperature", "High Temperature"),
    temperature("lowTemperature", "Low Temperature"),
    HUMIDITY,
    temperature("dewPoint", "Dew Point"),
    PRECIPITATION_PROBABILITY,
    text("precipitationDesc", "Precipitation Description"),
    RAIN_FALL,
    SNOW_FALL,
    text("airInfo", "Air Info"),
    text("airDescription", "Air Description"),
    WIND_SPEED,
    WIND_DIRECTION,
    text("windDesc", "Wind Description"),
    text("windDescShort", "Wind Description Short"),
    text("beaufortScale", "Beaufort Scale"),
    text("beaufortDescription", "Beaufort Description"),
    text("uvIndex", "UV Index"),
    text("uvDesc", "UV Description"),
    PRESSURE,
    text("iconName", "Icon Name"),
    text("dayOfWeek", "Day of Week"),
    text("weekday", "Week Day"),
    TIME,
];

const FORECAST_ASTRONOMY: &[SensorAttribute] = &[
    timestamp("sunRise", "Sunrise"),
    timestamp("sunSet", "Sunset"),
    timestamp("moonRise", "Moonrise"),
    timestamp("moonSet", "Moonset"),
    attr("moonPhase", "Moon Phase", None, Some(PERCENTAGE)),
    text("moonPhaseDescription", "Moon Phase Description"),
    text("iconName", "Icon Name"),
    text("city", "City"),
    attr("latitude", "Latitude", None, Some(DEGREE)),
    attr("longitude", "Longitude", None, Some(DEGREE)),
    TIME,
];

/// Attributes that make sense for `product`.
pub fn sensor_types(product: WeatherProductType) -> &'static [SensorAttribute] {
    match product {
        WeatherProductType::Observation => OBSERVATION,
        WeatherProductType::ForecastHourly => FORECAST_HOURLY,
        WeatherProductType::Forecast7Days => FORECAST_7DAYS,
        WeatherProductType::Forecast7DaysSimple => FORECAST_7DAYS_SIMPLE,
        WeatherProductType::ForecastAstronomy => FORECAST_ASTRONOMY,
    }
}

pub fn sensor_attribute(product: WeatherProductType, name: &str) -> Option<&'static SensorAttribute> {
    sensor_types(product).iter().find(|attribute| attribute.name == name)
}

pub fn is_valid_attribute(product: WeatherProductType, name: &str) -> bool {
    sensor_attribute(product, name).is_some()
}

/// Value of `name` in the period at `offset`.
///
/// An offset past the end, a missing key and an absent value all read as
/// `None`.
pub fn get_attribute<'a>(
    records: &'a [ForecastRecord],
    name: &str,
    offset: usize,
) -> Option<&'a FieldValue> {
    records
        .get(offset)
        .and_then(|record| record.get(name))
        .filter(|value| !value.is_absent())
}
