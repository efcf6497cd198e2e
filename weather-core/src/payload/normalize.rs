use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use tracing::warn;

use super::{
    extract::{Extracted, Place, RawRecord},
    time::{combine_utc_and_local, parse_provider_time},
};
use crate::model::{FieldValue, ForecastRecord, WeatherProductType};

/// The provider's "no data" marker.
pub const SENTINEL: &str = "*";

/// Attribute holding the absolute time of a period.
pub const TIME_FIELD: &str = "time";

/// Clock-only astronomy fields combined with [`TIME_FIELD`].
pub const CLOCK_FIELDS: [&str; 4] = ["sunRise", "sunSet", "moonRise", "moonSet"];

/// Older attribute names and their current spelling.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("utcTime", TIME_FIELD),
    ("sunrise", "sunRise"),
    ("sunset", "sunSet"),
    ("moonrise", "moonRise"),
    ("moonset", "moonSet"),
    ("moonPhaseDesc", "moonPhaseDescription"),
];

/// Turn located provider records into flat records with one stable shape.
///
/// The input is only read. Every output record carries the same keys; keys
/// missing from some records are filled with [`FieldValue::Absent`].
pub fn normalize(extracted: &Extracted<'_>, product: WeatherProductType) -> Vec<ForecastRecord> {
    let place = match product {
        WeatherProductType::ForecastAstronomy => extracted.place.as_ref(),
        _ => None,
    };

    let mut records: Vec<ForecastRecord> = extracted
        .records
        .iter()
        .map(|raw| normalize_record(raw, product, place))
        .collect();

    align_keys(&mut records);
    records
}

fn normalize_record(
    raw: &RawRecord,
    product: WeatherProductType,
    place: Option<&Place>,
) -> ForecastRecord {
    let mut record = ForecastRecord::new();

    for (key, value) in raw.iter().filter(|(key, _)| legacy_alias(key).is_none()) {
        record.insert(key.clone(), field_value(value));
    }
    for (key, value) in raw {
        if let Some(current) = legacy_alias(key) {
            record
                .entry(current.to_string())
                .or_insert_with(|| field_value(value));
        }
    }

    let time = absolutize_time(&mut record);

    if product == WeatherProductType::ForecastAstronomy {
        for field in CLOCK_FIELDS {
            let combined = match (record.get(field), time.as_ref()) {
                (Some(FieldValue::Text(clock)), Some(reference)) => {
                    combine_utc_and_local(clock, reference)
                }
                _ => None,
            };
            record.insert(field.to_string(), combined.map_or(FieldValue::Absent, FieldValue::Timestamp));
        }

        if let Some(place) = place {
            copy_place_field(&mut record, "city", place.city.as_ref());
            copy_place_field(&mut record, "latitude", place.latitude.as_ref());
            copy_place_field(&mut record, "longitude", place.longitude.as_ref());
        }
    }

    record
}

/// Replace the textual period time with a UTC timestamp.
///
/// Returns the parsed time in the provider's offset for clock combination.
fn absolutize_time(record: &mut ForecastRecord) -> Option<DateTime<FixedOffset>> {
    let parsed = match record.get(TIME_FIELD) {
        Some(FieldValue::Text(raw)) => {
            let parsed = parse_provider_time(raw);
            if parsed.is_none() {
                warn!(time = %raw, "Unparsable period time, treating as unavailable");
            }
            parsed
        }
        _ => None,
    };

    let value = parsed
        .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
        .unwrap_or(FieldValue::Absent);
    record.insert(TIME_FIELD.to_string(), value);

    parsed
}

fn copy_place_field(record: &mut ForecastRecord, key: &str, value: Option<&Value>) {
    let value = value.map_or(FieldValue::Absent, field_value);
    record.insert(key.to_string(), value);
}

fn legacy_alias(key: &str) -> Option<&'static str> {
    LEGACY_ALIASES
        .iter()
        .find(|(legacy, _)| *legacy == key)
        .map(|(_, current)| *current)
}

/// Map a JSON value to a field value, dropping the sentinel and nulls.
pub fn field_value(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Absent,
        Value::String(s) if s == SENTINEL => FieldValue::Absent,
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => FieldValue::Number(n.clone()),
        Value::Bool(b) => FieldValue::Bool(*b),
        Value::Array(_) | Value::Object(_) => FieldValue::Json(value.clone()),
    }
}

fn align_keys(records: &mut [ForecastRecord]) {
    let keys: BTreeSet<String> = records
        .iter()
        .flat_map(|record| record.keys().cloned())
        .collect();

    for record in records.iter_mut() {
        for key in &keys {
            if !record.contains_key(key) {
                record.insert(key.clone(), FieldValue::Absent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::extract::extract;
    use chrono::TimeZone;
    use serde_json::json;

    fn run(payload: &Value, product: WeatherProductType) -> Vec<ForecastRecord> {
        let extracted = extract(payload, product).unwrap();
        normalize(&extracted, product)
    }

    #[test]
    fn sentinel_becomes_absent_and_other_strings_are_kept() {
        let payload = json!({
            "dailyForecasts": [{"forecasts": [{
                "time": "2019-10-04T00:00:00Z",
                "windSpeed": "*",
                "highTemperature": "18.00",
                "description": "Snow. Cold."
            }]}]
        });

        let records = run(&payload, WeatherProductType::Forecast7DaysSimple);
        let record = &records[0];
        assert_eq!(record["windSpeed"], FieldValue::Absent);
        assert_eq!(record["highTemperature"], FieldValue::Text("18.00".into()));
        assert_eq!(record["description"], FieldValue::Text("Snow. Cold.".into()));
    }

    #[test]
    fn value_types_are_preserved() {
        let payload = json!({
            "observations": [{
                "time": "2019-10-04T04:00:00Z",
                "temperature": 12.5,
                "windDirection": 270,
                "daylight": true,
                "place": {"address": {"city": "New York"}},
                "snowCover": null
            }]
        });

        let record = &run(&payload, WeatherProductType::Observation)[0];
        assert!(matches!(record["temperature"], FieldValue::Number(_)));
        assert_eq!(record["windDirection"].as_i64(), Some(270));
        assert_eq!(record["daylight"], FieldValue::Bool(true));
        assert!(matches!(record["place"], FieldValue::Json(_)));
        assert_eq!(record["snowCover"], FieldValue::Absent);
    }

    #[test]
    fn time_becomes_utc_timestamp() {
        let payload = json!({
            "hourlyForecasts": {"forecastLocation": {"forecast": [
                {"utcTime": "2019-10-04T00:00:00.000-04:00", "temperature": "15.00"}
            ]}}
        });

        let record = &run(&payload, WeatherProductType::ForecastHourly)[0];
        assert_eq!(
            record[TIME_FIELD],
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2019, 10, 4, 4, 0, 0).unwrap())
        );
        assert!(!record.contains_key("utcTime"));
    }

    #[test]
    fn unparsable_time_is_absent() {
        let payload = json!({
            "observations": [{"time": "soon", "temperature": "1"}]
        });
        let record = &run(&payload, WeatherProductType::Observation)[0];
        assert_eq!(record[TIME_FIELD], FieldValue::Absent);
        assert_eq!(record["temperature"], FieldValue::Text("1".into()));
    }

    #[test]
    fn astronomy_clock_fields_are_combined() {
        let payload = json!({
            "astronomyForecasts": [{
                "place": {
                    "address": {"city": "New York"},
                    "location": {"lat": 40.79962, "lng": -73.970314}
                },
                "forecasts": [{
                    "time": "2019-10-04T04:00:00Z",
                    "sunRise": "6:55PM",
                    "sunSet": "18:33:00",
                    "moonRise": "*",
                    "moonPhase": 0.35
                }]
            }]
        });

        let record = &run(&payload, WeatherProductType::ForecastAstronomy)[0];
        assert_eq!(
            record["sunRise"],
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2019, 10, 4, 18, 55, 0).unwrap())
        );
        assert_eq!(
            record["sunSet"],
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2019, 10, 4, 18, 33, 0).unwrap())
        );
        assert_eq!(record["moonRise"], FieldValue::Absent);
        assert_eq!(record["moonSet"], FieldValue::Absent);
        assert_eq!(record["city"], FieldValue::Text("New York".into()));
        assert_eq!(record["latitude"].as_f64(), Some(40.79962));
        assert_eq!(record["longitude"].as_f64(), Some(-73.970314));
    }

    #[test]
    fn clock_fields_without_time_are_absent() {
        let payload = json!({
            "astronomyForecasts": [{
                "forecasts": [{"time": "*", "sunRise": "6:55AM"}]
            }]
        });
        let record = &run(&payload, WeatherProductType::ForecastAstronomy)[0];
        assert_eq!(record["sunRise"], FieldValue::Absent);
        assert_eq!(record[TIME_FIELD], FieldValue::Absent);
    }

    #[test]
    fn clock_fields_are_only_combined_for_astronomy() {
        let payload = json!({
            "observations": [{"time": "2019-10-04T04:00:00Z", "sunRise": "6:55AM"}]
        });
        let record = &run(&payload, WeatherProductType::Observation)[0];
        assert_eq!(record["sunRise"], FieldValue::Text("6:55AM".into()));
    }

    #[test]
    fn legacy_astronomy_gets_current_names_and_place() {
        let payload = json!({
            "astronomy": {
                "city": "New York",
                "latitude": 40.79962,
                "longitude": -73.970314,
                "astronomy": [{
                    "utcTime": "2019-10-04T00:00:00.000-04:00",
                    "sunrise": "6:55AM",
                    "sunset": "6:33PM",
                    "moonrise": "12:51PM",
                    "moonset": "10:19PM",
                    "moonPhaseDesc": "Waxing crescent"
                }]
            }
        });

        let record = &run(&payload, WeatherProductType::ForecastAstronomy)[0];
        assert_eq!(
            record["sunRise"],
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2019, 10, 4, 10, 55, 0).unwrap())
        );
        assert_eq!(
            record["moonSet"],
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2019, 10, 5, 2, 19, 0).unwrap())
        );
        assert_eq!(
            record["moonPhaseDescription"],
            FieldValue::Text("Waxing crescent".into())
        );
        assert_eq!(record["city"], FieldValue::Text("New York".into()));
        assert!(!record.contains_key("sunrise"));
    }

    #[test]
    fn records_share_one_key_set() {
        let payload = json!({
            "hourlyForecasts": [{"forecasts": [
                {"time": "2019-10-04T04:00:00Z", "rainFall": "0.1"},
                {"time": "2019-10-04T05:00:00Z", "snowFall": "0.3"}
            ]}]
        });

        let records = run(&payload, WeatherProductType::ForecastHourly);
        let first: Vec<_> = records[0].keys().collect();
        let second: Vec<_> = records[1].keys().collect();
        assert_eq!(first, second);
        assert_eq!(records[0]["snowFall"], FieldValue::Absent);
        assert_eq!(records[1]["rainFall"], FieldValue::Absent);
    }

    #[test]
    fn input_is_left_untouched() {
        let payload = json!({
            "observations": [{"time": "2019-10-04T04:00:00Z", "windSpeed": "*"}]
        });
        let before = payload.clone();
        let _ = run(&payload, WeatherProductType::Observation);
        assert_eq!(payload, before);
    }
}
