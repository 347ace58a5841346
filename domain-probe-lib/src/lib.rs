//! # Domain Probe Library
//!
//! A fast library for deciding whether domain names are registered, by
//! resolving them against public DNS servers with failover.
//!
//! It checks single names, bounded batches, or one base name against every
//! known extension at once, and can stream live progress of the latter to a
//! subscriber.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_probe_lib::{DomainChecker, ProbeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::new(ProbeConfig::default())?;
//!     let report = checker.check_all_extensions("mybrand").await?;
//!
//!     println!(
//!         "{}: {} of {} extensions available",
//!         report.domain_name, report.available_count, report.total_extensions
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **DNS Failover**: resolvers are tried in order within one time budget
//! - **Concurrent Processing**: semaphore-bounded fan-out, results in completion order
//! - **Live Progress**: full snapshots after every completed probe
//! - **History**: bounded, newest-first ledger of every probe
//! - **Configurable**: TOML files and `DP_*` environment variables

// Re-export main public API types and functions
// This makes them available as domain_probe_lib::TypeName
pub use checker::DomainChecker;
pub use concurrent::{BatchOutcome, ConcurrentProcessor, ProbeOutcome};
pub use config::{
    load_env_config, parse_resolver, parse_timeout, ConfigManager, DefaultsConfig, DnsConfig,
    EnvConfig, FileConfig,
};
pub use error::DomainProbeError;
pub use extensions::{parse_extensions, ExtensionRegistry};
pub use history::{HistoryLedger, HistoryPage};
pub use live::{CheckStarted, ProgressTracker, ServerMessage, Session};
pub use resolver::{DnsLookup, HickoryLookup, LookupFailure, Prober};
pub use summary::{build_report, suggestions, summarize, POPULAR_EXTENSIONS};
pub use types::{
    default_resolvers, AggregatedReport, Availability, CandidateFailure, DomainCheck,
    ProbeConfig, ProbeResult, ProgressSnapshot, Summary,
};
pub use utils::{normalize_domain, sanitize_base_name, split_name_and_extension, validate_format};

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod extensions;
mod history;
mod live;
mod resolver;
mod summary;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainProbeError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
