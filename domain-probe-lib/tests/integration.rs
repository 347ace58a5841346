// domain-probe-lib/tests/integration.rs

//! Integration tests for domain-probe-lib exports and core functionality

use async_trait::async_trait;
use domain_probe_lib::{
    Availability, DnsLookup, DomainChecker, DomainProbeError, ExtensionRegistry, LookupFailure,
    ProbeConfig, ServerMessage,
};
use std::collections::HashMap;
use std::io::Write;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Answers from a fixed table; unknown names get NXDOMAIN.
#[derive(Default)]
struct TableLookup {
    table: HashMap<String, Result<Vec<IpAddr>, LookupFailure>>,
    calls: AtomicUsize,
}

impl TableLookup {
    fn with(mut self, name: &str, answer: Result<Vec<IpAddr>, LookupFailure>) -> Self {
        self.table.insert(name.to_string(), answer);
        self
    }
}

#[async_trait]
impl DnsLookup for TableLookup {
    async fn lookup(&self, name: &str, _server: SocketAddr) -> Result<Vec<IpAddr>, LookupFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(LookupFailure::NotFound("no such host".to_string())))
    }
}

fn example_backend() -> TableLookup {
    TableLookup::default()
        .with("example.com", Ok(vec!["93.184.216.34".parse().unwrap()]))
        .with(
            "example.io",
            Err(LookupFailure::Failed("i/o timeout".to_string())),
        )
}

fn checker_with(backend: TableLookup) -> DomainChecker {
    let registry = ExtensionRegistry::from_extensions(["com", "net", "io"]);
    DomainChecker::with_parts(ProbeConfig::default(), registry, Arc::new(backend))
}

#[tokio::test]
async fn test_all_extensions_end_to_end() {
    let checker = checker_with(example_backend());
    let report = checker.check_all_extensions("example").await.unwrap();

    assert_eq!(report.domain_name, "example");
    assert_eq!(report.total_extensions, 3);
    assert_eq!(report.available_count, 1);
    assert_eq!(report.unavailable_count, 1);
    assert_eq!(report.error_count, 1);
    assert!(report.failures.is_empty());

    assert_eq!(report.unavailable_domains[0].name, "example.com");
    assert_eq!(
        report.unavailable_domains[0].ip.as_deref(),
        Some("93.184.216.34")
    );
    assert_eq!(report.available_domains[0].name, "example.net");
    assert_eq!(report.error_domains[0].name, "example.io");
    assert_eq!(report.error_domains[0].status, Availability::Error);

    assert_eq!(report.summary.popular_available, vec!["example.net"]);
    assert_eq!(report.summary.recommended_domains, vec!["example.net"]);
    assert_eq!(report.summary.alternative_suggestions.len(), 5);

    // Every produced result landed in the history
    let history = checker.history(1, 20);
    assert_eq!(history.total, 3);
    let mut ids: Vec<u64> = history.items.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_invalid_input_never_reaches_dns() {
    let backend = Arc::new(TableLookup::default());
    let registry = ExtensionRegistry::from_extensions(["com"]);
    let checker = DomainChecker::with_parts(
        ProbeConfig::default(),
        registry,
        Arc::clone(&backend) as Arc<dyn DnsLookup>,
    );

    let err = checker.check_domain("not a domain!").await.unwrap_err();
    assert!(err.is_validation());
    assert!(checker.check_all_extensions("").await.is_err());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bulk_check_keeps_going_past_bad_names() {
    let checker = checker_with(example_backend());
    let domains = vec![
        "example.com".to_string(),
        "bad..name".to_string(),
        "example.net".to_string(),
    ];

    let outcome = checker.check_domains(&domains).await.unwrap();
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].domain, "bad..name");

    match outcome.into_result() {
        Err(DomainProbeError::PartialBatchFailure { failed: 1, total: 3, first }) => {
            assert!(matches!(*first, DomainProbeError::InvalidFormat { .. }));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_reload_through_checker() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "com\nnet").unwrap();
    file.flush().unwrap();

    let registry = ExtensionRegistry::load(file.path()).unwrap();
    let checker =
        DomainChecker::with_parts(ProbeConfig::default(), registry, Arc::new(example_backend()));
    assert_eq!(checker.extensions().len(), 2);

    let before = tokio_test::block_on(checker.check_domain("example.io")).unwrap();
    assert!(!before.supported_tld);

    std::fs::write(file.path(), "com\nnet\nio\ndev\n").unwrap();
    assert_eq!(checker.reload_extensions().unwrap(), 4);
    assert_eq!(checker.extensions().len(), 4);

    let after = tokio_test::block_on(checker.check_domain("example.io")).unwrap();
    assert!(after.is_valid_tld);
    assert_eq!(after.domain.status, Availability::Error);
}

#[tokio::test]
async fn test_session_over_channels() {
    let checker = checker_with(example_backend());
    let session = checker.session();

    let (in_tx, in_rx) = mpsc::channel(4);
    let (out_tx, mut out_rx) = mpsc::unbounded_channel();
    let server = tokio::spawn(session.run(in_rx, out_tx));

    in_tx
        .send(r#"{"type":"check_all_extensions","data":{"domain_name":"example"}}"#.to_string())
        .await
        .unwrap();
    drop(in_tx);
    server.await.unwrap();

    let mut frames = Vec::new();
    while let Some(text) = out_rx.recv().await {
        frames.push(serde_json::from_str::<ServerMessage>(&text).unwrap());
    }

    assert!(matches!(frames.first(), Some(ServerMessage::Connected { .. })));
    assert!(matches!(
        frames.get(1),
        Some(ServerMessage::BulkCheckStarted { data }) if data.total_extensions == 3
    ));
    let progress = frames
        .iter()
        .filter(|f| matches!(f, ServerMessage::BulkCheckProgress { .. }))
        .count();
    assert_eq!(progress, 3);

    match frames.last() {
        Some(ServerMessage::BulkCheckComplete { data }) => {
            assert!(data.is_complete);
            assert_eq!(data.checked_count, 3);
            assert_eq!(data.error_count, 1);
        }
        other => panic!("last frame was {:?}", other),
    }
    assert_eq!(checker.history(1, 20).total, 3);
}

#[tokio::test]
#[ignore = "requires network access to public DNS resolvers"]
async fn test_live_lookup_of_well_known_domain() {
    let registry = ExtensionRegistry::from_extensions(["com"]);
    let config = ProbeConfig::default().with_timeout(Duration::from_secs(10));
    let backend = domain_probe_lib::HickoryLookup::new(&config.resolvers, config.attempt_timeout);
    let checker = DomainChecker::with_parts(config, registry, Arc::new(backend));

    let check = checker.check_domain("google.com").await.unwrap();
    assert_eq!(check.domain.status, Availability::Registered);
    assert!(check.supported_tld);
}
