//! Turning HERE payloads into flat per-period records.
//!
//! The provider has changed its response layout several times. [`extract`]
//! knows where each product lives in every layout, [`normalize`] hides the
//! remaining differences (field names, time formats, the `*` sentinel) so that
//! everything downstream sees one shape.

use serde_json::Value;

use crate::{
    error::HereError,
    model::{ForecastRecord, WeatherProductType},
};

pub mod extract;
pub mod normalize;
pub mod time;

pub use extract::{Extracted, Place, RawRecord, SchemaVersion, extract};
pub use normalize::{CLOCK_FIELDS, SENTINEL, TIME_FIELD, normalize};

/// Extract and normalize in one go.
pub fn records_for_product(
    payload: &Value,
    product: WeatherProductType,
) -> Result<Vec<ForecastRecord>, HereError> {
    let extracted = extract(payload, product)?;
    Ok(normalize(&extracted, product))
}
