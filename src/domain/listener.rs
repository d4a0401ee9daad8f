//! Listeners: public port to instance port mappings.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ElbError;

/// Requested listener as passed to the create operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSpec {
    /// Protocol name in any case (`http`, `HTTPS`, ...).
    pub protocol: String,
    /// Public port on the load balancer.
    pub load_balancer_port: u16,
    /// Port on the backend instances.
    pub instance_port: u16,
    /// Server certificate for TLS listeners.
    pub ssl_certificate_id: Option<String>,
}

impl ListenerSpec {
    /// Creates a spec without a certificate.
    #[must_use]
    pub fn new(protocol: impl Into<String>, load_balancer_port: u16, instance_port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            load_balancer_port,
            instance_port,
            ssl_certificate_id: None,
        }
    }

    /// Attaches a certificate id.
    #[must_use]
    pub fn with_certificate(mut self, ssl_certificate_id: impl Into<String>) -> Self {
        self.ssl_certificate_id = Some(ssl_certificate_id.into());
        self
    }
}

/// A listener on a load balancer.
///
/// Identified by `load_balancer_port` within its balancer. Only the
/// certificate can change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listener {
    load_balancer_port: u16,
    instance_port: u16,
    protocol: String,
    ssl_certificate_id: Option<String>,
}

impl Listener {
    /// Builds a listener, upper-casing the protocol.
    #[must_use]
    pub fn new(
        load_balancer_port: u16,
        instance_port: u16,
        protocol: &str,
        ssl_certificate_id: Option<String>,
    ) -> Self {
        Self {
            load_balancer_port,
            instance_port,
            protocol: protocol.to_ascii_uppercase(),
            ssl_certificate_id,
        }
    }

    /// Public port on the load balancer.
    #[must_use]
    pub const fn load_balancer_port(&self) -> u16 {
        self.load_balancer_port
    }

    /// Port on the backend instances.
    #[must_use]
    pub const fn instance_port(&self) -> u16 {
        self.instance_port
    }

    /// Upper-case protocol name.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Attached certificate, if any.
    #[must_use]
    pub fn ssl_certificate_id(&self) -> Option<&str> {
        self.ssl_certificate_id.as_deref()
    }

    pub(crate) fn set_ssl_certificate_id(&mut self, ssl_certificate_id: String) {
        self.ssl_certificate_id = Some(ssl_certificate_id);
    }
}

impl From<&ListenerSpec> for Listener {
    fn from(spec: &ListenerSpec) -> Self {
        Self::new(
            spec.load_balancer_port,
            spec.instance_port,
            &spec.protocol,
            spec.ssl_certificate_id.clone(),
        )
    }
}

/// Rejects zero ports and ports repeated within one request.
///
/// # Errors
///
/// Returns [`ElbError::InvalidRequest`] naming the first offending port.
pub fn validate_specs(specs: &[ListenerSpec]) -> Result<(), ElbError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if spec.load_balancer_port == 0 || spec.instance_port == 0 {
            return Err(ElbError::InvalidRequest(format!(
                "listener ports must be non-zero (load balancer port {}, instance port {})",
                spec.load_balancer_port, spec.instance_port
            )));
        }
        if !seen.insert(spec.load_balancer_port) {
            return Err(ElbError::InvalidRequest(format!(
                "duplicate load balancer port {} in request",
                spec.load_balancer_port
            )));
        }
    }
    Ok(())
}

/// Parses textual ports by numeric value, so `"80"` and `"080"` are equal.
///
/// # Errors
///
/// Returns [`ElbError::InvalidRequest`] for anything that is not a port
/// number.
pub fn parse_ports<S: AsRef<str>>(ports: &[S]) -> Result<Vec<u16>, ElbError> {
    ports
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            raw.trim()
                .parse::<u16>()
                .map_err(|_| ElbError::InvalidRequest(format!("invalid port: {raw:?}")))
        })
        .collect()
}
