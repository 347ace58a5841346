//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and the
//! environment, and layering them over [`ProbeConfig`] defaults with proper
//! precedence rules: CLI > environment > config files > defaults.

use crate::error::DomainProbeError;
use crate::types::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// concurrency = 20
/// timeout = "5s"
/// extensions_file = "/etc/domain-probe/extensions.txt"
///
/// [dns]
/// resolvers = ["9.9.9.9", "1.1.1.1:53"]
/// attempt_timeout = "1500ms"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for checker and CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Upstream DNS settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Default overall probe timeout (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Extension list location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_file: Option<PathBuf>,

    /// History ledger capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_capacity: Option<usize>,

    /// Maximum names accepted by one bulk check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bulk_domains: Option<usize>,

    /// Default JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// DNS resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DnsConfig {
    /// Resolver addresses, `ip` or `ip:port`, tried in order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolvers: Option<Vec<String>>,

    /// Budget for one attempt against one resolver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_timeout: Option<String>,
}

impl FileConfig {
    /// Layer this file's settings over `config`.
    ///
    /// Values are assumed validated; anything unparsable is left untouched.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(concurrency) = defaults.concurrency {
                config = config.with_concurrency(concurrency);
            }
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout) {
                config = config.with_timeout(timeout);
            }
            if let Some(path) = &defaults.extensions_file {
                config = config.with_extensions_file(path.clone());
            }
            if let Some(capacity) = defaults.history_capacity {
                config = config.with_history_capacity(capacity);
            }
            if let Some(max) = defaults.max_bulk_domains {
                config.max_bulk_domains = max;
            }
        }

        if let Some(dns) = &self.dns {
            if let Some(resolvers) = &dns.resolvers {
                let parsed = resolvers.iter().filter_map(|r| parse_resolver(r)).collect();
                config = config.with_resolvers(parsed);
            }
            if let Some(timeout) = dns.attempt_timeout.as_deref().and_then(parse_timeout) {
                config = config.with_attempt_timeout(timeout);
            }
        }

        config
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `DomainProbeError::Config` if the file is missing, unreadable,
    /// not valid TOML, or holds out-of-range values.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainProbeError::config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainProbeError::config(format!(
                "failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        // Validate the loaded configuration
        self.validate_config(&config)?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config has the lowest precedence, then the home directory, then
    /// the current directory.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainProbeError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config file")
                }
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            let files: Vec<String> = loaded_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            tracing::info!(
                files = ?files,
                "multiple config files found, later ones take precedence"
            );
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-probe.toml", "./.domain-probe.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let candidates = [".domain-probe.toml", "domain-probe.toml"];

        candidates
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-probe").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    concurrency: higher_defaults.concurrency.or(lower_defaults.concurrency),
                    timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                    extensions_file: higher_defaults
                        .extensions_file
                        .or(lower_defaults.extensions_file),
                    history_capacity: higher_defaults
                        .history_capacity
                        .or(lower_defaults.history_capacity),
                    max_bulk_domains: higher_defaults
                        .max_bulk_domains
                        .or(lower_defaults.max_bulk_domains),
                    json: higher_defaults.json.or(lower_defaults.json),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            dns: match (lower.dns, higher.dns) {
                (Some(lower_dns), Some(higher_dns)) => Some(DnsConfig {
                    resolvers: higher_dns.resolvers.or(lower_dns.resolvers),
                    attempt_timeout: higher_dns.attempt_timeout.or(lower_dns.attempt_timeout),
                }),
                (lower_dns, higher_dns) => higher_dns.or(lower_dns),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainProbeError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(DomainProbeError::config(
                        "Concurrency must be between 1 and 100",
                    ));
                }
            }

            if let Some(timeout_str) = &defaults.timeout {
                if parse_timeout(timeout_str).is_none() {
                    return Err(DomainProbeError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }

            if defaults.history_capacity == Some(0) {
                return Err(DomainProbeError::config(
                    "history_capacity must be at least 1",
                ));
            }

            if defaults.max_bulk_domains == Some(0) {
                return Err(DomainProbeError::config(
                    "max_bulk_domains must be at least 1",
                ));
            }
        }

        if let Some(dns) = &config.dns {
            if let Some(resolvers) = &dns.resolvers {
                for resolver in resolvers {
                    if parse_resolver(resolver).is_none() {
                        return Err(DomainProbeError::config(format!(
                            "Invalid resolver address '{}'. Use 'ip' or 'ip:port'",
                            resolver
                        )));
                    }
                }
            }

            if let Some(timeout_str) = &dns.attempt_timeout {
                if parse_timeout(timeout_str).is_none() {
                    return Err(DomainProbeError::config(format!(
                        "Invalid attempt_timeout format '{}'",
                        timeout_str
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DP_* environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<Duration>,
    pub extensions_file: Option<PathBuf>,
    pub resolvers: Option<Vec<SocketAddr>>,
    pub config: Option<PathBuf>,
}

impl EnvConfig {
    /// Layer the environment settings over `config`.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(path) = &self.extensions_file {
            config = config.with_extensions_file(path.clone());
        }
        if let Some(resolvers) = &self.resolvers {
            config = config.with_resolvers(resolvers.clone());
        }
        config
    }
}

/// Load configuration from environment variables.
///
/// Parses all DP_* environment variables. Invalid values are logged as
/// warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // DP_CONCURRENCY - concurrent domain checks
    if let Some(val) = lookup("DP_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if (1..=100).contains(&concurrency) => {
                tracing::debug!(concurrency, "using DP_CONCURRENCY");
                env_config.concurrency = Some(concurrency);
            }
            _ => tracing::warn!(value = %val, "invalid DP_CONCURRENCY, must be 1-100"),
        }
    }

    // DP_TIMEOUT - overall probe timeout
    if let Some(val) = lookup("DP_TIMEOUT") {
        match parse_timeout(&val) {
            Some(timeout) => {
                tracing::debug!(?timeout, "using DP_TIMEOUT");
                env_config.timeout = Some(timeout);
            }
            None => tracing::warn!(
                value = %val,
                "invalid DP_TIMEOUT, use format like '5s', '30s', '2m'"
            ),
        }
    }

    // DP_EXTENSIONS_FILE - extension list location
    if let Some(path) = lookup("DP_EXTENSIONS_FILE") {
        if !path.trim().is_empty() {
            tracing::debug!(path = %path, "using DP_EXTENSIONS_FILE");
            env_config.extensions_file = Some(PathBuf::from(path));
        }
    }

    // DP_RESOLVERS - comma-separated resolver list
    if let Some(val) = lookup("DP_RESOLVERS") {
        let parsed: Option<Vec<SocketAddr>> = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_resolver)
            .collect();
        match parsed {
            Some(resolvers) if !resolvers.is_empty() => {
                tracing::debug!(count = resolvers.len(), "using DP_RESOLVERS");
                env_config.resolvers = Some(resolvers);
            }
            _ => tracing::warn!(
                value = %val,
                "invalid DP_RESOLVERS, use comma-separated 'ip' or 'ip:port'"
            ),
        }
    }

    // DP_CONFIG - explicit config file
    if let Some(path) = lookup("DP_CONFIG") {
        if !path.trim().is_empty() {
            tracing::debug!(path = %path, "using DP_CONFIG");
            env_config.config = Some(PathBuf::from(path));
        }
    }

    env_config
}

/// Parse a timeout string like "5s", "30s", "2m", "500ms" or bare seconds.
pub fn parse_timeout(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Parse a resolver address; a bare IP gets port 53.
pub fn parse_resolver(value: &str) -> Option<SocketAddr> {
    let value = value.trim();
    value
        .parse::<SocketAddr>()
        .ok()
        .or_else(|| value.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, 53)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_timeout("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout("invalid"), None);
    }

    #[test]
    fn test_parse_timeout_overflow() {
        assert_eq!(parse_timeout("400000000000000000m"), None);
        assert_eq!(
            parse_timeout("18446744073709551615s"),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn test_parse_resolver() {
        assert_eq!(parse_resolver("9.9.9.9"), Some("9.9.9.9:53".parse().unwrap()));
        assert_eq!(parse_resolver("1.1.1.1:5353"), Some("1.1.1.1:5353".parse().unwrap()));
        assert_eq!(parse_resolver("[::1]:53"), Some("[::1]:53".parse().unwrap()));
        assert_eq!(parse_resolver("dns.google"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
concurrency = 25
timeout = "3s"
json = true

[dns]
resolvers = ["9.9.9.9", "1.1.1.1:53"]
attempt_timeout = "750ms"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.clone().unwrap();
        assert_eq!(defaults.concurrency, Some(25));
        assert_eq!(defaults.json, Some(true));

        let probe = config.apply_to(ProbeConfig::default());
        assert_eq!(probe.concurrency, 25);
        assert_eq!(probe.timeout, Duration::from_secs(3));
        assert_eq!(probe.attempt_timeout, Duration::from_millis(750));
        assert_eq!(
            probe.resolvers,
            vec!["9.9.9.9:53".parse().unwrap(), "1.1.1.1:53".parse().unwrap()]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let manager = ConfigManager::new(false);

        let zero = write_config("[defaults]\nconcurrency = 0\n");
        assert!(manager.load_file(zero.path()).is_err());

        let bad_timeout = write_config("[defaults]\ntimeout = \"soon\"\n");
        assert!(manager.load_file(bad_timeout.path()).is_err());

        let bad_resolver = write_config("[dns]\nresolvers = [\"not-an-ip\"]\n");
        assert!(manager.load_file(bad_resolver.path()).is_err());

        let not_toml = write_config("this is = = not toml");
        assert!(matches!(
            manager.load_file(not_toml.path()),
            Err(DomainProbeError::Config { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let manager = ConfigManager::new(false);
        assert!(manager.load_file("/no/such/domain-probe.toml").is_err());
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                timeout: Some("5s".to_string()),
                json: Some(false),
                ..Default::default()
            }),
            dns: Some(DnsConfig {
                resolvers: Some(vec!["9.9.9.9".to_string()]),
                attempt_timeout: None,
            }),
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(25),
                json: Some(true),
                ..Default::default()
            }),
            dns: None,
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.concurrency, Some(25)); // Higher wins
        assert_eq!(defaults.timeout, Some("5s".to_string())); // Lower preserved
        assert_eq!(defaults.json, Some(true)); // Higher wins
        assert_eq!(merged.dns.unwrap().resolvers, Some(vec!["9.9.9.9".to_string()]));
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = [
            ("DP_CONCURRENCY", "30"),
            ("DP_TIMEOUT", "2m"),
            ("DP_RESOLVERS", "9.9.9.9, 1.0.0.1:53"),
            ("DP_EXTENSIONS_FILE", "/tmp/ext.txt"),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(env_config.concurrency, Some(30));
        assert_eq!(env_config.timeout, Some(Duration::from_secs(120)));
        assert_eq!(env_config.resolvers.as_ref().map(Vec::len), Some(2));
        assert!(env_config.config.is_none());

        let probe = env_config.apply_to(ProbeConfig::default());
        assert_eq!(probe.concurrency, 30);
        assert_eq!(probe.extensions_file, PathBuf::from("/tmp/ext.txt"));
    }

    #[test]
    fn test_env_config_ignores_invalid_values() {
        let vars: HashMap<&str, &str> = [
            ("DP_CONCURRENCY", "0"),
            ("DP_TIMEOUT", "later"),
            ("DP_RESOLVERS", "9.9.9.9,bogus"),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()));
        assert!(env_config.concurrency.is_none());
        assert!(env_config.timeout.is_none());
        assert!(env_config.resolvers.is_none());
    }
}
