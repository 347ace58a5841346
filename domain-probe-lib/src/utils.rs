//! Utility functions for domain normalization and validation.
//!
//! Every raw, user-supplied name goes through these helpers before any
//! network activity happens.

use crate::error::DomainProbeError;
use regex::Regex;

lazy_static::lazy_static! {
    /// Dot-joined labels of 1-63 chars; alphanumeric ends, hyphens inside.
    static ref DOMAIN_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("domain regex is valid");

    /// A single label, used for base names checked against every extension.
    static ref LABEL_REGEX: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?$").expect("label regex is valid");
}

/// Strip one leading `http://`, `https://` and `www.`, in that order.
fn strip_prefixes(domain: &str) -> &str {
    let domain = domain.strip_prefix("http://").unwrap_or(domain);
    let domain = domain.strip_prefix("https://").unwrap_or(domain);
    domain.strip_prefix("www.").unwrap_or(domain)
}

/// Canonicalize a raw domain string.
///
/// Lower-cases, trims whitespace, strips a scheme and `www.` prefix and
/// removes one trailing slash. Never fails.
///
/// # Examples
///
/// ```rust
/// use domain_probe_lib::normalize_domain;
///
/// assert_eq!(normalize_domain("  HTTPS://www.Example.COM/ "), "example.com");
/// ```
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = strip_prefixes(&lowered);
    stripped.strip_suffix('/').unwrap_or(stripped).to_string()
}

/// Check the syntactic shape of a domain name.
///
/// Scheme and `www.` prefixes are ignored. Each dot-separated label must be
/// 1-63 characters, alphanumeric with internal hyphens.
pub fn validate_format(domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    DOMAIN_REGEX.is_match(strip_prefixes(domain))
}

/// Split a name at its last dot into base and extension.
///
/// The extension keeps its leading dot. A name without a dot has an empty
/// extension.
///
/// # Examples
///
/// ```rust
/// use domain_probe_lib::split_name_and_extension;
///
/// assert_eq!(
///     split_name_and_extension("shop.example.co"),
///     ("shop.example".to_string(), ".co".to_string())
/// );
/// assert_eq!(split_name_and_extension("example"), ("example".to_string(), String::new()));
/// ```
pub fn split_name_and_extension(domain: &str) -> (String, String) {
    match domain.rfind('.') {
        Some(idx) => (domain[..idx].to_string(), domain[idx..].to_string()),
        None => (domain.to_string(), String::new()),
    }
}

/// Normalize an extension token: trimmed, lower-case, leading dot.
///
/// Returns `None` for blank tokens.
pub fn normalize_extension(token: &str) -> Option<String> {
    let token = token.trim().to_lowercase();
    if token.is_empty() || token == "." {
        return None;
    }
    if token.starts_with('.') {
        Some(token)
    } else {
        Some(format!(".{}", token))
    }
}

/// Reduce raw input to the single-label base name used for extension fan-out.
///
/// Anything after the first dot is dropped, so `"Example.com"` and
/// `"example"` both yield `"example"`.
pub fn sanitize_base_name(raw: &str) -> Result<String, DomainProbeError> {
    let normalized = normalize_domain(raw);
    let base = normalized.split('.').next().unwrap_or_default();

    if base.is_empty() || !LABEL_REGEX.is_match(base) {
        return Err(DomainProbeError::invalid_format(raw.trim()));
    }

    Ok(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("Example.COM"), "example.com");
        assert_eq!(normalize_domain("  example.com  "), "example.com");
        assert_eq!(normalize_domain("http://example.com"), "example.com");
        assert_eq!(normalize_domain("https://example.com/"), "example.com");
        assert_eq!(normalize_domain("www.example.com"), "example.com");
        assert_eq!(normalize_domain("https://www.example.com/"), "example.com");
    }

    #[test]
    fn test_normalize_strips_each_prefix_once() {
        assert_eq!(normalize_domain("www.www.example.com"), "www.example.com");
        assert_eq!(normalize_domain("example.com//"), "example.com/");
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("example.com"));
        assert!(validate_format("sub.example.co.uk"));
        assert!(validate_format("my-site.io"));
        assert!(validate_format("example"));
        assert!(validate_format("https://www.example.com"));

        assert!(!validate_format(""));
        assert!(!validate_format("not a domain!"));
        assert!(!validate_format("-example.com"));
        assert!(!validate_format("example-.com"));
        assert!(!validate_format("example..com"));
        assert!(!validate_format(".com"));
        assert!(!validate_format("example.com."));
    }

    #[test]
    fn test_validate_format_label_length() {
        let label_63 = "a".repeat(63);
        let label_64 = "a".repeat(64);
        assert!(validate_format(&format!("{}.com", label_63)));
        assert!(!validate_format(&format!("{}.com", label_64)));
    }

    #[test]
    fn test_split_name_and_extension() {
        assert_eq!(
            split_name_and_extension("example.com"),
            ("example".to_string(), ".com".to_string())
        );
        assert_eq!(
            split_name_and_extension("test.co.uk"),
            ("test.co".to_string(), ".uk".to_string())
        );
        assert_eq!(
            split_name_and_extension("example"),
            ("example".to_string(), String::new())
        );
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension("com"), Some(".com".to_string()));
        assert_eq!(normalize_extension(" .IO "), Some(".io".to_string()));
        assert_eq!(normalize_extension("   "), None);
        assert_eq!(normalize_extension("."), None);
    }

    #[test]
    fn test_sanitize_base_name() {
        assert_eq!(sanitize_base_name("Example").unwrap(), "example");
        assert_eq!(sanitize_base_name("https://www.example.com/").unwrap(), "example");
        assert_eq!(sanitize_base_name("my-brand").unwrap(), "my-brand");

        assert!(sanitize_base_name("").is_err());
        assert!(sanitize_base_name("-brand").is_err());
        assert!(sanitize_base_name("not a domain!").is_err());
        assert!(sanitize_base_name(".com").is_err());
    }
}
