//! Single-probe resolver.
//!
//! A probe decides whether one fully-qualified name is registered by resolving
//! it against an ordered list of DNS servers, failing over from one server to
//! the next until one of them answers with addresses.

use crate::error::DomainProbeError;
use crate::types::{Availability, ProbeResult};
use crate::utils::{normalize_domain, split_name_and_extension, validate_format};
use async_trait::async_trait;
use chrono::Utc;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a single lookup against one server produced no address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The server gave a negative answer: the name does not exist
    NotFound(String),

    /// Anything else: timeout, refusal, unreachable server
    Failed(String),
}

impl LookupFailure {
    fn message(&self) -> &str {
        match self {
            LookupFailure::NotFound(msg) | LookupFailure::Failed(msg) => msg,
        }
    }
}

/// Address lookup against one specific DNS server.
///
/// The production implementation is [`HickoryLookup`]; tests substitute a
/// scripted implementation.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn lookup(&self, name: &str, server: SocketAddr) -> Result<Vec<IpAddr>, LookupFailure>;
}

/// `hickory-resolver` backend with one resolver per upstream server.
pub struct HickoryLookup {
    resolvers: HashMap<SocketAddr, TokioAsyncResolver>,
    attempt_timeout: Duration,
}

impl HickoryLookup {
    /// Build one resolver per server, each bounded by `attempt_timeout`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(servers: &[SocketAddr], attempt_timeout: Duration) -> Self {
        let resolvers = servers
            .iter()
            .map(|server| (*server, build_resolver(*server, attempt_timeout)))
            .collect();

        Self {
            resolvers,
            attempt_timeout,
        }
    }
}

fn build_resolver(server: SocketAddr, attempt_timeout: Duration) -> TokioAsyncResolver {
    let group = NameServerConfigGroup::from_ips_clear(&[server.ip()], server.port(), true);
    let config = ResolverConfig::from_parts(None, vec![], group);

    let mut opts = ResolverOpts::default();
    opts.timeout = attempt_timeout;
    opts.attempts = 1;
    // No search-domain expansion and no caching: every probe asks the server.
    opts.ndots = 0;
    opts.cache_size = 0;
    opts.use_hosts_file = false;

    TokioAsyncResolver::tokio(config, opts)
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup(&self, name: &str, server: SocketAddr) -> Result<Vec<IpAddr>, LookupFailure> {
        let resolver = match self.resolvers.get(&server) {
            Some(resolver) => resolver.clone(),
            None => build_resolver(server, self.attempt_timeout),
        };

        match resolver.lookup_ip(name).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => {
                let message = e.to_string();
                match e.kind() {
                    // NXDOMAIN, an empty answer and SERVFAIL are all read as
                    // "no such host".
                    ResolveErrorKind::NoRecordsFound { response_code, .. }
                        if matches!(
                            *response_code,
                            ResponseCode::NXDomain | ResponseCode::NoError | ResponseCode::ServFail
                        ) =>
                    {
                        Err(LookupFailure::NotFound(message))
                    }
                    _ => Err(LookupFailure::Failed(message)),
                }
            }
        }
    }
}

/// Runs probes and hands out result identifiers.
pub struct Prober {
    backend: Arc<dyn DnsLookup>,
    servers: Vec<SocketAddr>,
    timeout: Duration,
    attempt_timeout: Duration,
    next_id: AtomicU64,
}

impl Prober {
    /// Create a prober over `servers`, tried in order, with a per-probe budget.
    ///
    /// Until [`Prober::with_attempt_timeout`] is used, a single server may
    /// spend the whole budget.
    pub fn new(backend: Arc<dyn DnsLookup>, servers: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self {
            backend,
            servers,
            timeout,
            attempt_timeout: timeout,
            next_id: AtomicU64::new(1),
        }
    }

    /// Bound each server attempt so a hanging server leaves time for the next.
    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    /// Upper bound of one server attempt.
    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Default overall budget of a probe.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a candidate with the default budget.
    pub async fn probe(&self, candidate: &str) -> Result<ProbeResult, DomainProbeError> {
        self.probe_with_timeout(candidate, self.timeout).await
    }

    /// Probe a candidate within `budget`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` or `MissingExtension` for bad input; no DNS
    /// server is contacted in that case. Network failures are not errors:
    /// they come back as a result classified `Error`.
    pub async fn probe_with_timeout(
        &self,
        candidate: &str,
        budget: Duration,
    ) -> Result<ProbeResult, DomainProbeError> {
        let start = Instant::now();
        let name = normalize_domain(candidate);

        if !validate_format(&name) {
            return Err(DomainProbeError::invalid_format(name));
        }

        let (_, extension) = split_name_and_extension(&name);
        if extension.is_empty() {
            return Err(DomainProbeError::missing_extension(name));
        }

        // A budget too large for an Instant means no overall deadline.
        let deadline = start.checked_add(budget);
        let mut outcome: Result<Vec<IpAddr>, LookupFailure> =
            Err(LookupFailure::Failed("no DNS servers configured".to_string()));

        for server in &self.servers {
            let limit = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break;
                    }
                    remaining.min(self.attempt_timeout)
                }
                None => self.attempt_timeout,
            };

            tracing::debug!(domain = %name, %server, ?limit, "resolving");
            let attempt = self.backend.lookup(&name, *server);
            outcome = match tokio::time::timeout(limit, attempt).await {
                Ok(Ok(addrs)) if addrs.is_empty() => Err(LookupFailure::NotFound(format!(
                    "lookup {} on {}: no addresses",
                    name, server
                ))),
                Ok(result) => result,
                Err(_) => Err(LookupFailure::Failed(format!(
                    "lookup {} on {}: timed out after {:?}",
                    name, server, limit
                ))),
            };

            if outcome.is_ok() {
                break;
            }
        }

        let (status, ip, error) = match outcome {
            Ok(addrs) => (Availability::Registered, addrs.first().map(IpAddr::to_string), None),
            Err(failure @ LookupFailure::NotFound(_)) => {
                (Availability::Available, None, Some(failure.message().to_string()))
            }
            Err(failure) => {
                let err = DomainProbeError::probe_network(&name, failure.message());
                tracing::debug!(domain = %name, error = %err, "probe failed");
                (Availability::Error, None, Some(failure.message().to_string()))
            }
        };

        Ok(ProbeResult {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name,
            extension,
            available: status == Availability::Available,
            status,
            dns_resolved: status == Availability::Registered,
            ip,
            checked_at: Utc::now(),
            response_time_ms: start.elapsed().as_millis() as u64,
            error,
        })
    }
}
