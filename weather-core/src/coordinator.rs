//! Per-product refresh cycle and the cache entities read from.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    config::ConfigEntry,
    error::{SetupError, UpdateFailed},
    model::{ForecastRecord, WeatherProductType, WeatherRequest},
    payload::records_for_product,
    provider::WeatherProvider,
    units::UnitSystem,
};

/// Shortest interval a coordinator polls at; a zero period would stall the timer.
pub const MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for one provider call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Keeps the latest normalized records of one product at one location.
///
/// A successful refresh replaces the cached records as a whole. A failed one
/// leaves them in place but marks the coordinator unavailable until the next
/// success.
#[derive(Debug)]
pub struct Coordinator {
    provider: Arc<dyn WeatherProvider>,
    request: WeatherRequest,
    update_interval: Duration,
    request_timeout: Duration,
    data: Option<Arc<[ForecastRecord]>>,
    last_update_success: bool,
    last_updated: Option<DateTime<Utc>>,
}

impl Coordinator {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        request: WeatherRequest,
        update_interval: Duration,
    ) -> Self {
        Self {
            provider,
            request,
            update_interval: update_interval.max(MIN_UPDATE_INTERVAL),
            request_timeout: REQUEST_TIMEOUT,
            data: None,
            last_update_success: false,
            last_updated: None,
        }
    }

    pub fn for_entry(
        provider: Arc<dyn WeatherProvider>,
        entry: &ConfigEntry,
        product: WeatherProductType,
        units: UnitSystem,
    ) -> Self {
        let request = WeatherRequest {
            latitude: entry.data.latitude,
            longitude: entry.data.longitude,
            product,
            language: entry.options.language,
            units,
        };

        Self::new(provider, request, Duration::from_secs(entry.options.scan_interval))
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn product(&self) -> WeatherProductType {
        self.request.product
    }

    pub fn request(&self) -> &WeatherRequest {
        &self.request
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Run one fetch, extract and normalize cycle.
    pub async fn refresh(&mut self) -> Result<(), UpdateFailed> {
        let product = self.request.product;

        match self.fetch().await {
            Ok(records) => {
                if !self.last_update_success && self.last_updated.is_some() {
                    info!(%product, "Fetching HERE data recovered");
                }
                debug!(%product, periods = records.len(), "Fetched HERE data");

                self.data = Some(records.into());
                self.last_update_success = true;
                self.last_updated = Some(Utc::now());
                Ok(())
            }
            Err(reason) => {
                if self.last_update_success {
                    warn!(%product, %reason, "Error fetching HERE data");
                } else {
                    debug!(%product, %reason, "Error fetching HERE data");
                }

                self.last_update_success = false;
                Err(UpdateFailed { product, reason })
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<ForecastRecord>, String> {
        let payload = timeout(
            self.request_timeout,
            self.provider.weather_for_coordinates(&self.request),
        )
        .await
        .map_err(|_| format!("request timed out after {:?}", self.request_timeout))?
        .map_err(|err| err.to_string())?;

        records_for_product(&payload, self.request.product).map_err(|err| err.to_string())
    }

    /// Records of the last successful cycle, kept across failed ones.
    pub fn data(&self) -> Option<&[ForecastRecord]> {
        self.data.as_deref()
    }

    /// Shared handle on the current records; unaffected by later refreshes.
    pub fn snapshot(&self) -> Option<Arc<[ForecastRecord]>> {
        self.data.clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Entities backed by this coordinator report values only while true.
    pub fn is_available(&self) -> bool {
        self.last_update_success && self.data.is_some()
    }
}

/// Create and prime one coordinator per product for `entry`.
///
/// Fails if any first refresh fails, so a location never comes up half
/// populated.
pub async fn setup_entry(
    provider: Arc<dyn WeatherProvider>,
    entry: &ConfigEntry,
    units: UnitSystem,
) -> Result<Vec<Coordinator>, SetupError> {
    let mut coordinators = Vec::with_capacity(WeatherProductType::all().len());

    for product in WeatherProductType::all() {
        let mut coordinator = Coordinator::for_entry(provider.clone(), entry, *product, units);
        coordinator.refresh().await?;
        coordinators.push(coordinator);
    }

    info!(name = %entry.data.name, id = %entry.unique_id(), "HERE weather location set up");
    Ok(coordinators)
}
