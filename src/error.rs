//! Registry error types with a caller-facing classification.
//!
//! [`ElbError`] is the central error type for the crate. Each variant maps
//! to an [`ErrorKind`] and a stable numeric code so that API adapters can
//! translate conditions into their own responses without string matching.

use serde::Serialize;

/// Coarse error category exposed to adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The referenced load balancer or region does not exist.
    NotFound,
    /// The request asks for something this registry does not model.
    Unsupported,
    /// The arguments are malformed or conflict with each other.
    Validation,
}

/// Registry error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category    |
/// |-----------|-------------|
/// | 1000–1999 | Validation  |
/// | 2000–2999 | Not Found   |
/// | 5000–5999 | Unsupported |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElbError {
    /// No load balancer with the given name exists in the region.
    #[error("load balancer not found: {0}")]
    LoadBalancerNotFound(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Region name is syntactically invalid.
    #[error("invalid region name: {0:?}")]
    InvalidRegion(String),

    /// Region is valid but no registry was configured for it.
    #[error("unknown region: {0}")]
    UnknownRegion(String),

    /// Attribute is a provider-computed value this registry does not model.
    #[error("attribute {0} is not supported by this registry")]
    Unsupported(String),

    /// Attribute name is not recognized at all.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
}

impl ElbError {
    /// Returns the [`ErrorKind`] for this variant.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LoadBalancerNotFound(_) | Self::UnknownRegion(_) => ErrorKind::NotFound,
            Self::InvalidRequest(_) | Self::InvalidRegion(_) | Self::UnknownAttribute(_) => {
                ErrorKind::Validation
            }
            Self::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRegion(_) => 1002,
            Self::UnknownAttribute(_) => 1003,
            Self::LoadBalancerNotFound(_) => 2001,
            Self::UnknownRegion(_) => 2002,
            Self::Unsupported(_) => 5001,
        }
    }

    /// Shorthand for [`ElbError::LoadBalancerNotFound`].
    pub(crate) fn not_found(name: &str) -> Self {
        Self::LoadBalancerNotFound(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinct_from_unsupported() {
        let missing = ElbError::not_found("lb1");
        let derived = ElbError::Unsupported("DNSName".to_string());
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(derived.kind(), ErrorKind::Unsupported);
        assert_ne!(missing.error_code(), derived.error_code());
    }

    #[test]
    fn display_includes_subject() {
        let err = ElbError::not_found("my-lb");
        assert_eq!(err.to_string(), "load balancer not found: my-lb");

        let err = ElbError::UnknownRegion("mars-1".to_string());
        assert!(err.to_string().contains("mars-1"));
    }

    #[test]
    fn codes_fall_in_category_ranges() {
        let cases = [
            ElbError::InvalidRequest(String::new()),
            ElbError::InvalidRegion(String::new()),
            ElbError::UnknownAttribute(String::new()),
            ElbError::LoadBalancerNotFound(String::new()),
            ElbError::UnknownRegion(String::new()),
            ElbError::Unsupported(String::new()),
        ];
        for err in cases {
            let code = err.error_code();
            match err.kind() {
                ErrorKind::Validation => assert!((1000..2000).contains(&code)),
                ErrorKind::NotFound => assert!((2000..3000).contains(&code)),
                ErrorKind::Unsupported => assert!((5000..6000).contains(&code)),
            }
        }
    }
}
