//! Registry configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`).
//!
//! | Variable             | Default                         |
//! |----------------------|---------------------------------|
//! | `ELB_REGIONS`        | [`DEFAULT_REGIONS`], comma-separated |
//! | `EVENT_BUS_CAPACITY` | `10000`                         |

use std::sync::Arc;

use crate::domain::{EventBus, RegionName, RegionRegistries};
use crate::error::ElbError;
use crate::service::ElbService;

/// Regions served when `ELB_REGIONS` is not set.
pub const DEFAULT_REGIONS: [&str; 8] = [
    "us-east-1",
    "us-west-1",
    "us-west-2",
    "eu-west-1",
    "ap-northeast-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "sa-east-1",
];

/// Top-level registry configuration.
///
/// Loaded once at startup via [`ElbConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ElbConfig {
    /// Regions that get a registry.
    pub regions: Vec<RegionName>,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,
}

impl Default for ElbConfig {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS
                .iter()
                .filter_map(|r| RegionName::new(r).ok())
                .collect(),
            event_bus_capacity: 10_000,
        }
    }
}

impl ElbConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::InvalidRegion`] if `ELB_REGIONS` names an
    /// invalid region.
    pub fn from_env() -> Result<Self, ElbError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let regions = match std::env::var("ELB_REGIONS") {
            Ok(raw) => parse_regions(&raw)?,
            Err(_) => defaults.regions,
        };
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity);

        Ok(Self {
            regions,
            event_bus_capacity,
        })
    }

    /// Builds one empty registry per configured region and the service
    /// that fronts them.
    #[must_use]
    pub fn build_service(&self) -> ElbService {
        let regions = Arc::new(RegionRegistries::new(self.regions.iter().cloned()));
        tracing::info!(regions = regions.len(), "region registries initialized");
        ElbService::new(regions, EventBus::new(self.event_bus_capacity))
    }
}

/// Parses a comma-separated region list, skipping blank items.
///
/// # Errors
///
/// Returns [`ElbError::InvalidRegion`] for the first malformed name.
pub fn parse_regions(raw: &str) -> Result<Vec<RegionName>, ElbError> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(RegionName::new)
        .collect()
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_all_default_regions() {
        let config = ElbConfig::default();
        assert_eq!(config.regions.len(), DEFAULT_REGIONS.len());
        assert_eq!(config.event_bus_capacity, 10_000);
    }

    #[test]
    fn parse_regions_skips_blanks() {
        let Ok(regions) = parse_regions(" us-east-1, ,eu-west-1,") else {
            panic!("valid list");
        };
        let names: Vec<&str> = regions.iter().map(RegionName::as_str).collect();
        assert_eq!(names, vec!["us-east-1", "eu-west-1"]);
    }

    #[test]
    fn parse_regions_rejects_invalid_name() {
        let result = parse_regions("us-east-1,EU WEST");
        assert!(matches!(result, Err(ElbError::InvalidRegion(_))));
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: usize = parse_env("ELB_REGISTRY_TEST_SURELY_UNSET", 7);
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn build_service_serves_configured_regions() {
        let Ok(regions) = parse_regions("us-east-1,us-west-2") else {
            panic!("valid list");
        };
        let config = ElbConfig {
            regions,
            event_bus_capacity: 16,
        };
        let service = config.build_service();
        assert_eq!(service.regions().len(), 2);

        let Ok(us_west) = RegionName::new("us-west-2") else {
            panic!("valid region");
        };
        let Ok(all) = service.describe_load_balancers::<&str>(&us_west, &[]).await else {
            panic!("region configured");
        };
        assert!(all.is_empty());
    }
}
