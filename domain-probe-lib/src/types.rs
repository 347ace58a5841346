//! Core data types for domain availability probing.
//!
//! This module defines the data structures that flow through the library:
//! single probe results, aggregated fan-out reports, live progress snapshots
//! and the checker configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Availability classification of a probed name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Availability {
    /// The name did not resolve with a definitive negative answer
    Available,

    /// The name resolved to at least one address
    Registered,

    /// Resolution failed for another reason (timeout, refused, unreachable)
    Error,
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Availability::Available => write!(f, "Available"),
            Availability::Registered => write!(f, "Registered"),
            Availability::Error => write!(f, "Error"),
        }
    }
}

/// Result of probing one fully-qualified candidate name.
///
/// Created once when the probe completes and never mutated afterwards.
/// Copies of it are appended to the history ledger and handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    /// Monotonically increasing identifier, unique per checker
    pub id: u64,

    /// The candidate name that was checked (e.g., "example.com")
    pub name: String,

    /// Extension of the candidate, with its leading dot (e.g., ".com")
    pub extension: String,

    /// Convenience flag, true iff `status` is `Available`
    pub available: bool,

    /// Availability classification
    pub status: Availability,

    /// First resolved address, present iff `status` is `Registered`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Whether DNS resolution succeeded
    pub dns_resolved: bool,

    /// When the probe completed
    pub checked_at: DateTime<Utc>,

    /// Wall-clock duration of the probe in milliseconds
    pub response_time_ms: u64,

    /// Resolver message for `Error` results, and for `Available` results
    /// decided by a negative answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// Whether the result is counted as a failed probe.
    pub fn is_error(&self) -> bool {
        self.status == Availability::Error
    }
}

/// Response of the single-check entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCheck {
    /// The probe outcome
    pub domain: ProbeResult,

    /// Whether the extension is part of the loaded extension set
    pub is_valid_tld: bool,

    /// Same as `is_valid_tld`, kept for clients that read either field
    pub supported_tld: bool,
}

/// A candidate that could not produce a [`ProbeResult`] at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateFailure {
    /// The candidate as it was submitted
    pub domain: String,

    /// Human-readable reason
    pub error: String,
}

/// Derived recommendations for an all-extensions check.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Summary {
    /// Available candidates with a popular extension
    pub popular_available: Vec<String>,

    /// Candidates worth registering, popular ones first
    pub recommended_domains: Vec<String>,

    /// Alternative `.com` names derived from the base name
    pub alternative_suggestions: Vec<String>,

    /// Successful probe with the lowest response time
    pub fastest_response: Option<ProbeResult>,

    /// Successful probe with the highest response time
    pub slowest_response: Option<ProbeResult>,
}

/// Result of checking one base name against every known extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedReport {
    pub domain_name: String,
    pub total_extensions: usize,
    pub available_count: usize,
    pub unavailable_count: usize,
    pub error_count: usize,
    pub checked_at: DateTime<Utc>,
    pub total_time_ms: u64,
    pub available_domains: Vec<ProbeResult>,
    pub unavailable_domains: Vec<ProbeResult>,
    pub error_domains: Vec<ProbeResult>,

    /// Every produced result, in completion order
    pub all_results: Vec<ProbeResult>,

    /// Candidates that produced no result; counted in `error_count`
    pub failures: Vec<CandidateFailure>,

    pub summary: Summary,
}

/// Full point-in-time view of an in-flight all-extensions check.
///
/// Every emission carries the whole state, never a diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    pub domain_name: String,
    pub total_extensions: usize,
    pub checked_count: usize,
    pub available_count: usize,
    pub unavailable_count: usize,
    pub error_count: usize,

    /// The most recently completed probe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_domain: Option<ProbeResult>,

    pub available_domains: Vec<ProbeResult>,
    pub unavailable_domains: Vec<ProbeResult>,
    pub is_complete: bool,
    pub total_time_ms: u64,
}

/// Public resolvers tried in order: Google, Cloudflare, OpenDNS.
pub fn default_resolvers() -> Vec<SocketAddr> {
    vec![
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 53),
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 53),
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(208, 67, 222, 222)), 53),
    ]
}

/// Configuration options for probing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of concurrent probes
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Overall budget for a single probe, across every resolver
    /// Default: 5 seconds
    #[serde(skip)]
    pub timeout: Duration,

    /// Budget for one attempt against one resolver
    /// Default: 2 seconds
    #[serde(skip)]
    pub attempt_timeout: Duration,

    /// DNS servers, tried in order until one answers
    pub resolvers: Vec<SocketAddr>,

    /// Maximum number of entries kept in the history ledger
    /// Default: 1000
    pub history_capacity: usize,

    /// Maximum number of names accepted by one bulk check
    /// Default: 50
    pub max_bulk_domains: usize,

    /// Newline-delimited extension list
    pub extensions_file: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(2),
            resolvers: default_resolvers(),
            history_capacity: 1000,
            max_bulk_domains: 50,
            extensions_file: PathBuf::from("./data/domain_extensions.txt"),
        }
    }
}

impl ProbeConfig {
    /// Set concurrency, capped at 100 to prevent resource exhaustion.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the overall per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-resolver attempt timeout.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Replace the resolver list. An empty list keeps the defaults.
    pub fn with_resolvers(mut self, resolvers: Vec<SocketAddr>) -> Self {
        if !resolvers.is_empty() {
            self.resolvers = resolvers;
        }
        self
    }

    /// Set the history ledger capacity (at least 1).
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    /// Set the extension list location.
    pub fn with_extensions_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.extensions_file = path.into();
        self
    }
}
