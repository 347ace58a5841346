//! Error handling for domain probing operations.
//!
//! This module defines the error type shared by every layer of the library,
//! from input validation up to batch dispatch.

use thiserror::Error;

/// Main error type for domain probing operations.
///
/// DNS-level failures are not represented here as thrown errors: they are
/// folded into the `Error` classification of a [`crate::ProbeResult`] so that
/// bulk operations keep going. The variants below are the failures that do
/// reach a caller.
#[derive(Debug, Clone, Error)]
pub enum DomainProbeError {
    /// Malformed candidate name, rejected before any network activity
    #[error("invalid domain format: {domain}")]
    InvalidFormat { domain: String },

    /// Syntactically valid name that has no dot-separated suffix
    #[error("domain must have an extension: {domain}")]
    MissingExtension { domain: String },

    /// Request-level input problems (empty batch, batch too large, ...)
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Every configured resolver failed for a reason other than a negative answer
    #[error("DNS lookup failed for '{domain}': {message}")]
    ProbeNetwork { domain: String, message: String },

    /// The extension source could not be read
    #[error("failed to load extensions from '{path}': {message}")]
    Load { path: String, message: String },

    /// A probe task could not produce a result at all (panicked or cancelled)
    #[error("failed to check {domain}: {message}")]
    Dispatch { domain: String, message: String },

    /// Some candidates of a batch failed outright; the first failure is kept
    #[error("{failed} of {total} domain checks failed; first error: {first}")]
    PartialBatchFailure {
        failed: usize,
        total: usize,
        first: Box<DomainProbeError>,
    },

    /// Configuration errors (invalid settings, unparsable files, ...)
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl DomainProbeError {
    /// Create a new invalid format error.
    pub fn invalid_format<D: Into<String>>(domain: D) -> Self {
        Self::InvalidFormat {
            domain: domain.into(),
        }
    }

    /// Create a new missing extension error.
    pub fn missing_extension<D: Into<String>>(domain: D) -> Self {
        Self::MissingExtension {
            domain: domain.into(),
        }
    }

    /// Create a new invalid input error.
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new network error for a probe.
    pub fn probe_network<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::ProbeNetwork {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new extension load error.
    pub fn load<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new dispatch error.
    pub fn dispatch<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::Dispatch {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error was raised by input validation, before any DNS traffic.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. } | Self::MissingExtension { .. } | Self::InvalidInput { .. }
        )
    }
}

impl From<std::io::Error> for DomainProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::Config {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for DomainProbeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

impl From<serde_json::Error> for DomainProbeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}
