//! Main domain checker implementation.
//!
//! This module provides the primary `DomainChecker` struct that owns the
//! extension registry, the history ledger and the probing engine, and exposes
//! every public entry point of the library.

use crate::concurrent::{BatchOutcome, ConcurrentProcessor};
use crate::error::DomainProbeError;
use crate::extensions::ExtensionRegistry;
use crate::history::{HistoryLedger, HistoryPage};
use crate::live::Session;
use crate::resolver::{DnsLookup, HickoryLookup, Prober};
use crate::summary::build_report;
use crate::types::{AggregatedReport, DomainCheck, ProbeConfig};
use crate::utils::sanitize_base_name;
use std::sync::Arc;
use std::time::Instant;

/// Main domain checker that coordinates availability checking operations.
///
/// Construct it once and share it behind an `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```rust,no_run
/// use domain_probe_lib::{DomainChecker, ProbeConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = DomainChecker::new(ProbeConfig::default())?;
///     let check = checker.check_domain("example.com").await?;
///     println!("{}: {}", check.domain.name, check.domain.status);
///     Ok(())
/// }
/// ```
pub struct DomainChecker {
    /// Configuration settings for this checker instance
    config: ProbeConfig,
    registry: Arc<ExtensionRegistry>,
    ledger: Arc<HistoryLedger>,
    prober: Arc<Prober>,
    processor: ConcurrentProcessor,
}

impl DomainChecker {
    /// Create a checker that resolves through `hickory-resolver`.
    ///
    /// Loads the extension list from `config.extensions_file`. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `DomainProbeError::Load` if the extension file is unreadable.
    pub fn new(config: ProbeConfig) -> Result<Self, DomainProbeError> {
        let registry = ExtensionRegistry::load(&config.extensions_file)?;
        let backend = HickoryLookup::new(&config.resolvers, config.attempt_timeout);
        Ok(Self::with_parts(config, registry, Arc::new(backend)))
    }

    /// Create a checker from an already built registry and DNS backend.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_probe_lib::{DomainChecker, ExtensionRegistry, HickoryLookup, ProbeConfig};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let config = ProbeConfig::default().with_concurrency(20);
    /// let registry = ExtensionRegistry::from_extensions(["com", "net"]);
    /// let backend = HickoryLookup::new(&config.resolvers, Duration::from_secs(1));
    ///
    /// let checker = DomainChecker::with_parts(config, registry, Arc::new(backend));
    /// assert_eq!(checker.extensions().len(), 2);
    /// # }
    /// ```
    pub fn with_parts(
        config: ProbeConfig,
        registry: ExtensionRegistry,
        backend: Arc<dyn DnsLookup>,
    ) -> Self {
        let registry = Arc::new(registry);
        let ledger = Arc::new(HistoryLedger::new(config.history_capacity));
        let prober = Arc::new(
            Prober::new(backend, config.resolvers.clone(), config.timeout)
                .with_attempt_timeout(config.attempt_timeout),
        );
        let processor = ConcurrentProcessor::new(Arc::clone(&prober), config.concurrency)
            .with_ledger(Arc::clone(&ledger));

        Self {
            config,
            registry,
            ledger,
            prober,
            processor,
        }
    }

    /// Check availability of a single domain.
    ///
    /// The result is recorded in the history ledger. DNS failures do not make
    /// this method fail; they show up as an `Error` classification.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` or `MissingExtension` for malformed input.
    pub async fn check_domain(&self, domain: &str) -> Result<DomainCheck, DomainProbeError> {
        let result = self.prober.probe(domain).await?;
        self.ledger.record(result.clone());

        let supported = self.registry.contains(&result.extension);
        Ok(DomainCheck {
            domain: result,
            is_valid_tld: supported,
            supported_tld: supported,
        })
    }

    /// Check several domains concurrently.
    ///
    /// Results come back in completion order. Per-domain failures are
    /// collected in the outcome instead of failing the whole call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty list or one longer than
    /// `max_bulk_domains`.
    pub async fn check_domains(
        &self,
        domains: &[String],
    ) -> Result<BatchOutcome, DomainProbeError> {
        if domains.is_empty() {
            return Err(DomainProbeError::invalid_input("no domains provided"));
        }
        if domains.len() > self.config.max_bulk_domains {
            return Err(DomainProbeError::invalid_input(format!(
                "too many domains: {} (maximum {})",
                domains.len(),
                self.config.max_bulk_domains
            )));
        }

        Ok(self.processor.check_many(domains.to_vec()).await)
    }

    /// Check one base name against every known extension.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if `name` does not reduce to a single valid label.
    pub async fn check_all_extensions(
        &self,
        name: &str,
    ) -> Result<AggregatedReport, DomainProbeError> {
        let started = Instant::now();
        let base = sanitize_base_name(name)?;

        let candidates: Vec<String> = self
            .registry
            .list()
            .into_iter()
            .map(|ext| format!("{}{}", base, ext))
            .collect();
        let total = candidates.len();

        tracing::info!(domain = %base, extensions = total, "checking all extensions");
        let outcome = self.processor.check_many(candidates).await;

        if let Some(first) = &outcome.first_error {
            tracing::warn!(
                domain = %base,
                failed = outcome.failures.len(),
                first = %first,
                "some candidates produced no result"
            );
        }

        Ok(build_report(&base, total, outcome, started.elapsed()))
    }

    /// One page of past results, newest first.
    pub fn history(&self, page: usize, per_page: usize) -> HistoryPage {
        self.ledger.list(page, per_page)
    }

    pub fn clear_history(&self) {
        self.ledger.clear();
    }

    /// Every known extension, order unspecified.
    pub fn extensions(&self) -> Vec<String> {
        self.registry.list()
    }

    /// Re-read the extension file; the previous set stays on failure.
    pub fn reload_extensions(&self) -> Result<usize, DomainProbeError> {
        self.registry.reload()
    }

    /// Open a live progress session for one subscriber.
    pub fn session(&self) -> Session {
        Session::new(Arc::clone(&self.registry), self.processor.clone())
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}
