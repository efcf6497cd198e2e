use serde::{Deserialize, Serialize};

pub const TEMP_CELSIUS: &str = "°C";
pub const TEMP_FAHRENHEIT: &str = "°F";
pub const LENGTH_CENTIMETERS: &str = "cm";
pub const LENGTH_INCHES: &str = "in";
pub const LENGTH_KILOMETERS: &str = "km";
pub const LENGTH_MILES: &str = "mi";
pub const SPEED_KILOMETERS_PER_HOUR: &str = "km/h";
pub const SPEED_MILES_PER_HOUR: &str = "mph";
pub const PRESSURE_MBAR: &str = "mbar";
pub const PRESSURE_INHG: &str = "inHg";
pub const PERCENTAGE: &str = "%";
pub const DEGREE: &str = "°";

/// Metric unit paired with its imperial counterpart.
const METRIC_TO_IMPERIAL: &[(&str, &str)] = &[
    (TEMP_CELSIUS, TEMP_FAHRENHEIT),
    (LENGTH_CENTIMETERS, LENGTH_INCHES),
    (SPEED_KILOMETERS_PER_HOUR, SPEED_MILES_PER_HOUR),
    (PRESSURE_MBAR, PRESSURE_INHG),
    (LENGTH_KILOMETERS, LENGTH_MILES),
];

/// Unit system the values are requested and displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn is_metric(&self) -> bool {
        matches!(self, UnitSystem::Metric)
    }

    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

/// Unit to display for an attribute whose table entry is in metric.
///
/// Units without an imperial counterpart (percentages, degrees, or no unit at
/// all) are returned unchanged.
pub fn display_unit(is_metric: bool, unit: Option<&'static str>) -> Option<&'static str> {
    let unit = unit?;
    if is_metric {
        return Some(unit);
    }

    let converted = METRIC_TO_IMPERIAL
        .iter()
        .find(|(metric, _)| *metric == unit)
        .map_or(unit, |(_, imperial)| *imperial);

    Some(converted)
}
