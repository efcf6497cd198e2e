//! Core library for the `here-weather` integration.
//!
//! This crate defines:
//! - The HERE provider client and the provider abstraction
//! - Payload extraction and normalization across HERE schema revisions
//! - Update coordinators caching normalized records per product
//! - Sensor and weather entity views, attribute metadata and display units
//! - Configuration & credentials handling
//!
//! It is used by `here-weather`, but can also be embedded in other services.

pub mod attributes;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod model;
pub mod payload;
pub mod provider;
pub mod units;

pub use config::{Config, ConfigEntry, EntryData, EntryOptions};
pub use coordinator::{Coordinator, setup_entry};
pub use entity::{Forecast, Sensor, WeatherEntity};
pub use error::{FormError, HereError, SetupError, UpdateFailed};
pub use model::{FieldValue, ForecastRecord, Language, WeatherProductType, WeatherRequest};
pub use provider::{WeatherProvider, here::HereProvider};
pub use units::UnitSystem;
