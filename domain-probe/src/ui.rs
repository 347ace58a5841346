//! Terminal display logic for domain-probe.
//!
//! Colored result lines, grouped sections, the all-extensions report and a
//! spinner for long checks. Uses only the `console` crate.

use console::{pad_str, style, Alignment, Term};
use domain_probe_lib::{
    AggregatedReport, Availability, CandidateFailure, DomainCheck, HistoryPage, ProbeResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner, or `None` when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        if !Term::stderr().is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let term = Term::stderr();
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

pub fn print_header(what: &str, concurrency: usize) {
    println!(
        "{} {} {}",
        style("domain-probe").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!("· {}", what)).dim(),
    );
    println!("{}", style(format!("Concurrency: {}", concurrency)).dim());
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Format and print a single probe result with colors and alignment.
pub fn print_result(result: &ProbeResult) {
    let padded = pad_str(&result.name, DOMAIN_WIDTH, Alignment::Left, Some(".."));

    match result.status {
        Availability::Available => {
            println!(
                "  {}  {}",
                style(&padded).white(),
                style("AVAILABLE").green().bold(),
            );
        }
        Availability::Registered => {
            let ip = result
                .ip
                .as_deref()
                .map(|ip| format!("  {}", style(ip).dim()))
                .unwrap_or_default();
            println!(
                "  {}  {}{}",
                style(&padded).white(),
                style("TAKEN").red().bold(),
                ip,
            );
        }
        Availability::Error => {
            println!(
                "  {}  {}  {}",
                style(&padded).white(),
                style("ERROR").yellow(),
                style(brief_error(result)).dim(),
            );
        }
    }
}

pub fn print_check(check: &DomainCheck) {
    print_result(&check.domain);
    if !check.supported_tld {
        println!(
            "  {}",
            style(format!(
                "note: {} is not in the extension list",
                check.domain.extension
            ))
            .dim()
        );
    }
    println!(
        "  {}",
        style(format!("checked in {}ms", check.domain.response_time_ms)).dim()
    );
}

// ── Grouped output ───────────────────────────────────────────────────────────

/// Print results grouped by status: Available, Taken, Error.
/// Empty sections are omitted entirely.
pub fn print_grouped_results(results: &[ProbeResult]) {
    let mut sorted: Vec<&ProbeResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let sections = [
        (Availability::Available, "Available"),
        (Availability::Registered, "Taken"),
        (Availability::Error, "Error"),
    ];

    for (status, label) in sections {
        let group: Vec<&&ProbeResult> = sorted.iter().filter(|r| r.status == status).collect();
        if group.is_empty() {
            continue;
        }

        let heading = format!("── {} ({}) ", label, group.len());
        let rule = "─".repeat(50usize.saturating_sub(heading.chars().count()));
        let (heading, rule) = match status {
            Availability::Available => (style(heading).green().bold(), style(rule).green().dim()),
            Availability::Registered => (style(heading).red().bold(), style(rule).red().dim()),
            Availability::Error => (style(heading).yellow().bold(), style(rule).yellow().dim()),
        };
        println!("  {} {}", heading, rule);

        for r in group {
            let padded = pad_str(&r.name, DOMAIN_WIDTH, Alignment::Left, Some(".."));
            match r.status {
                Availability::Error => {
                    println!("    {}  {}", style(&padded).white(), style(brief_error(r)).dim())
                }
                _ => println!("    {}", style(&padded).white()),
            }
        }
        println!();
    }
}

pub fn print_failures(failures: &[CandidateFailure]) {
    if failures.is_empty() {
        return;
    }

    println!("  {}", style("Some domains could not be checked:").yellow());
    for failure in failures {
        println!(
            "    {} {}",
            style(&failure.domain).white(),
            style(format!("({})", failure.error)).dim()
        );
    }
    println!();
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(
    total: usize,
    available: usize,
    taken: usize,
    errors: usize,
    duration: Duration,
) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(total).bold(),
        if total == 1 { "" } else { "s" },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", available)).green(),
        style("|").dim(),
        style(format!("{} taken", taken)).red(),
        style("|").dim(),
        style(format!("{} errors", errors)).yellow(),
    );
}

/// Print a full all-extensions report.
pub fn print_report(report: &AggregatedReport) {
    print_grouped_results(&report.all_results);
    print_failures(&report.failures);

    let summary = &report.summary;
    if !summary.recommended_domains.is_empty() {
        println!("  {}", style("Recommended").bold());
        for name in &summary.recommended_domains {
            println!("    {}", style(name).green());
        }
        println!();
    }

    if !summary.alternative_suggestions.is_empty() {
        println!("  {}", style("You might also try").bold());
        println!("    {}", style(summary.alternative_suggestions.join(", ")).dim());
        println!();
    }

    if let (Some(fastest), Some(slowest)) = (&summary.fastest_response, &summary.slowest_response) {
        println!(
            "  {}",
            style(format!(
                "fastest: {} ({}ms)  slowest: {} ({}ms)",
                fastest.name, fastest.response_time_ms, slowest.name, slowest.response_time_ms
            ))
            .dim()
        );
    }

    print_summary(
        report.total_extensions,
        report.available_count,
        report.unavailable_count,
        report.error_count,
        Duration::from_millis(report.total_time_ms),
    );
}

pub fn print_extensions(extensions: &[String]) {
    println!(
        "{}",
        style(format!("{} known extensions", extensions.len())).bold()
    );
    for chunk in extensions.chunks(8) {
        println!("  {}", chunk.join("  "));
    }
}

pub fn print_history(page: &HistoryPage) {
    println!();
    println!(
        "  {}",
        style(format!(
            "History (page {}/{}, {} total)",
            page.page,
            page.total_pages.max(1),
            page.total
        ))
        .bold()
    );
    for result in &page.items {
        println!(
            "  {} {}",
            style(format!("#{:<4}", result.id)).dim(),
            style(format!("{:<30} {}", result.name, result.status)).white()
        );
    }
}

/// Extract a brief error reason from an `Error` result.
fn brief_error(result: &ProbeResult) -> &'static str {
    match &result.error {
        Some(msg) => {
            let m = msg.to_lowercase();
            if m.contains("timeout") || m.contains("timed out") {
                "(timeout)"
            } else if m.contains("refused") {
                "(refused)"
            } else if m.contains("network") || m.contains("unreachable") || m.contains("connect") {
                "(network error)"
            } else {
                "(error)"
            }
        }
        None => "(unknown status)",
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(name: &str, error: Option<&str>) -> ProbeResult {
        ProbeResult {
            id: 1,
            name: name.to_string(),
            extension: ".com".to_string(),
            available: false,
            status: Availability::Error,
            ip: None,
            dns_resolved: false,
            checked_at: chrono::Utc::now(),
            response_time_ms: 3,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_brief_error_timeout() {
        let r = make_result("a.com", Some("lookup a.com: timed out after 5s"));
        assert_eq!(brief_error(&r), "(timeout)");
    }

    #[test]
    fn test_brief_error_refused() {
        let r = make_result("a.com", Some("query refused by server"));
        assert_eq!(brief_error(&r), "(refused)");
    }

    #[test]
    fn test_brief_error_unknown_status() {
        let r = make_result("a.com", None);
        assert_eq!(brief_error(&r), "(unknown status)");
    }
}
