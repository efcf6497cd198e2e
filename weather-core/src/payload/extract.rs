use serde_json::{Map, Value};
use tracing::debug;

use crate::{error::HereError, model::WeatherProductType};

/// Provider record before normalization.
pub type RawRecord = Map<String, Value>;

/// Payload layout revision the records were found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Destination Weather 1.0: objects keyed by product, `utcTime` stamps.
    Legacy,
    /// Weather 3: arrays of per-place containers, `time` stamps.
    V3,
    /// Weather 3 still wrapped in its top-level `places` array.
    V3Places,
}

/// Location metadata kept next to the astronomy records instead of on them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Place {
    pub city: Option<Value>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
}

/// Records located in a raw payload, borrowed from it.
#[derive(Debug, Clone)]
pub struct Extracted<'a> {
    pub schema: SchemaVersion,
    pub records: Vec<&'a RawRecord>,
    pub place: Option<Place>,
}

/// Locate the per-period records for `product` in `payload`.
///
/// Fails with [`HereError::MalformedPayload`] as soon as one step of the
/// product's path is missing; partial results are never returned. The raw
/// payload is logged at debug level on failure.
pub fn extract(payload: &Value, product: WeatherProductType) -> Result<Extracted<'_>, HereError> {
    locate(payload, product).map_err(|reason| {
        debug!(%product, %reason, %payload, "Payload malformed");
        HereError::MalformedPayload(format!("{product}: {reason}"))
    })
}

fn locate(payload: &Value, product: WeatherProductType) -> Result<Extracted<'_>, String> {
    let root = Walk::root(payload);
    let (root, wrapped) = if payload.get("places").is_some() {
        (root.key("places")?.first()?, true)
    } else {
        (root, false)
    };

    let current_key = current_container(product);
    let legacy_key = legacy_container(product);

    let value = root.value;
    match (value.get(current_key), value.get(legacy_key)) {
        (Some(Value::Array(_)), _) => {
            let schema = if wrapped { SchemaVersion::V3Places } else { SchemaVersion::V3 };
            locate_current(root, product, schema)
        }
        (_, Some(Value::Object(_))) if !wrapped => locate_legacy(root, product),
        _ => Err(format!("missing `{}.{current_key}`", root.path)),
    }
}

fn current_container(product: WeatherProductType) -> &'static str {
    match product {
        WeatherProductType::Observation => "observations",
        WeatherProductType::ForecastHourly => "hourlyForecasts",
        WeatherProductType::Forecast7Days => "extendedDailyForecasts",
        WeatherProductType::Forecast7DaysSimple => "dailyForecasts",
        WeatherProductType::ForecastAstronomy => "astronomyForecasts",
    }
}

fn legacy_container(product: WeatherProductType) -> &'static str {
    match product {
        WeatherProductType::Observation => "observations",
        WeatherProductType::ForecastHourly => "hourlyForecasts",
        WeatherProductType::Forecast7Days => "forecasts",
        WeatherProductType::Forecast7DaysSimple => "dailyForecasts",
        WeatherProductType::ForecastAstronomy => "astronomy",
    }
}

fn locate_current<'a>(
    root: Walk<'a>,
    product: WeatherProductType,
    schema: SchemaVersion,
) -> Result<Extracted<'a>, String> {
    let container = root.key(current_container(product))?;

    let (records, place) = match product {
        WeatherProductType::Observation => (container.records()?, None),
        WeatherProductType::ForecastAstronomy => {
            let location = container.first()?;
            let place = location.value.get("place").map(|place| Place {
                city: pointer(place, "/address/city"),
                latitude: pointer(place, "/location/lat"),
                longitude: pointer(place, "/location/lng"),
            });
            (location.key("forecasts")?.records()?, place)
        }
        _ => (container.first()?.key("forecasts")?.records()?, None),
    };

    Ok(Extracted { schema, records, place })
}

fn locate_legacy(root: Walk<'_>, product: WeatherProductType) -> Result<Extracted<'_>, String> {
    let container = root.key(legacy_container(product))?;

    let (records, place) = match product {
        WeatherProductType::Observation => (
            container.key("location")?.first()?.key("observation")?.records()?,
            None,
        ),
        WeatherProductType::ForecastAstronomy => {
            let place = Place {
                city: pointer(container.value, "/city"),
                latitude: pointer(container.value, "/latitude"),
                longitude: pointer(container.value, "/longitude"),
            };
            (container.key("astronomy")?.records()?, Some(place))
        }
        _ => (container.key("forecastLocation")?.key("forecast")?.records()?, None),
    };

    Ok(Extracted { schema: SchemaVersion::Legacy, records, place })
}

fn pointer(value: &Value, path: &str) -> Option<Value> {
    value.pointer(path).filter(|v| !v.is_null()).cloned()
}

/// Cursor through the payload that remembers how it got there.
#[derive(Debug, Clone)]
struct Walk<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Walk<'a> {
    fn root(value: &'a Value) -> Self {
        Self { value, path: "$".to_string() }
    }

    fn key(self, key: &str) -> Result<Self, String> {
        let path = format!("{}.{key}", self.path);
        match self.value.get(key) {
            Some(value) if !value.is_null() => Ok(Self { value, path }),
            _ => Err(format!("missing `{path}`")),
        }
    }

    fn first(self) -> Result<Self, String> {
        match self.value.as_array().and_then(|items| items.first()) {
            Some(value) => Ok(Self { value, path: format!("{}[0]", self.path) }),
            None => Err(format!("expected a non-empty array at `{}`", self.path)),
        }
    }

    fn records(self) -> Result<Vec<&'a RawRecord>, String> {
        let items = self
            .value
            .as_array()
            .ok_or_else(|| format!("expected an array at `{}`", self.path))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_object()
                    .ok_or_else(|| format!("expected an object at `{}[{i}]`", self.path))
            })
            .collect()
    }
}
