//! Region identity and the per-region registry set.
//!
//! [`RegionName`] is a validated newtype so region strings cannot be
//! confused with load balancer names. [`RegionRegistries`] owns one
//! [`LoadBalancerRegistry`] per configured region for the lifetime of the
//! process.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::LoadBalancerRegistry;
use crate::error::ElbError;

/// Name of a region, e.g. `us-east-1`.
///
/// Non-empty, made of lower-case ASCII letters, digits and `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RegionName(String);

impl RegionName {
    /// Validates and wraps a region name.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::InvalidRegion`] if the name is empty or contains
    /// characters other than lower-case letters, digits and `-`.
    pub fn new(name: &str) -> Result<Self, ElbError> {
        let valid = !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if !valid {
            return Err(ElbError::InvalidRegion(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the region name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RegionName {
    type Err = ElbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// One [`LoadBalancerRegistry`] per configured region.
///
/// Built once at start and never torn down. Region membership is fixed
/// after construction.
#[derive(Debug, Default)]
pub struct RegionRegistries {
    registries: HashMap<RegionName, Arc<LoadBalancerRegistry>>,
}

impl RegionRegistries {
    /// Creates an empty registry for every given region. Repeated regions
    /// share one registry.
    #[must_use]
    pub fn new(regions: impl IntoIterator<Item = RegionName>) -> Self {
        let registries = regions
            .into_iter()
            .map(|region| (region, Arc::new(LoadBalancerRegistry::new())))
            .collect();
        Self { registries }
    }

    /// Returns the registry for `region`.
    ///
    /// # Errors
    ///
    /// Returns [`ElbError::UnknownRegion`] if the region was not configured.
    pub fn get(&self, region: &RegionName) -> Result<Arc<LoadBalancerRegistry>, ElbError> {
        self.registries
            .get(region)
            .cloned()
            .ok_or_else(|| ElbError::UnknownRegion(region.to_string()))
    }

    /// Configured region names, sorted.
    #[must_use]
    pub fn regions(&self) -> Vec<RegionName> {
        let mut regions: Vec<RegionName> = self.registries.keys().cloned().collect();
        regions.sort();
        regions
    }

    /// Number of configured regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registries.len()
    }

    /// Returns `true` if no region is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}
