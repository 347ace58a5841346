//! Aggregation of fan-out results into a report with recommendations.

use crate::concurrent::BatchOutcome;
use crate::types::{AggregatedReport, Availability, ProbeResult, Summary};
use chrono::Utc;
use std::time::Duration;

/// Extensions favoured when recommending names.
pub const POPULAR_EXTENSIONS: [&str; 7] = [".com", ".net", ".org", ".io", ".co", ".app", ".dev"];

const MAX_POPULAR_RECOMMENDATIONS: usize = 5;
const MAX_RECOMMENDATIONS: usize = 10;
const SUGGESTION_COUNT: usize = 5;

/// Build the report for an all-extensions check of `domain_name`.
///
/// `total` is the number of dispatched candidates. Results are bucketed by
/// classification; candidates without a result count as errors but appear
/// only in `failures`.
pub fn build_report(
    domain_name: &str,
    total: usize,
    outcome: BatchOutcome,
    elapsed: Duration,
) -> AggregatedReport {
    let BatchOutcome {
        results, failures, ..
    } = outcome;

    let mut available_domains = Vec::new();
    let mut unavailable_domains = Vec::new();
    let mut error_domains = Vec::new();

    for result in &results {
        match result.status {
            Availability::Available => available_domains.push(result.clone()),
            Availability::Registered => unavailable_domains.push(result.clone()),
            Availability::Error => error_domains.push(result.clone()),
        }
    }

    let summary = summarize(domain_name, &results);

    AggregatedReport {
        domain_name: domain_name.to_string(),
        total_extensions: total,
        available_count: available_domains.len(),
        unavailable_count: unavailable_domains.len(),
        error_count: error_domains.len() + failures.len(),
        checked_at: Utc::now(),
        total_time_ms: elapsed.as_millis() as u64,
        available_domains,
        unavailable_domains,
        error_domains,
        all_results: results,
        failures,
        summary,
    }
}

/// Derive recommendations from results listed in completion order.
pub fn summarize(base: &str, results: &[ProbeResult]) -> Summary {
    let available: Vec<&ProbeResult> = results
        .iter()
        .filter(|r| r.status == Availability::Available)
        .collect();

    let popular_available: Vec<String> = available
        .iter()
        .filter(|r| POPULAR_EXTENSIONS.contains(&r.extension.as_str()))
        .map(|r| r.name.clone())
        .collect();

    let mut recommended_domains: Vec<String> = popular_available
        .iter()
        .take(MAX_POPULAR_RECOMMENDATIONS)
        .cloned()
        .collect();
    for result in &available {
        if recommended_domains.len() >= MAX_RECOMMENDATIONS {
            break;
        }
        if !recommended_domains.contains(&result.name) {
            recommended_domains.push(result.name.clone());
        }
    }

    let alternative_suggestions = if available.len() < SUGGESTION_COUNT {
        suggestions(base)
    } else {
        Vec::new()
    };

    // Strict comparisons: on ties the first result seen wins.
    let mut fastest: Option<&ProbeResult> = None;
    let mut slowest: Option<&ProbeResult> = None;
    for result in results.iter().filter(|r| !r.is_error()) {
        if fastest.map_or(true, |f| result.response_time_ms < f.response_time_ms) {
            fastest = Some(result);
        }
        if slowest.map_or(true, |s| result.response_time_ms > s.response_time_ms) {
            slowest = Some(result);
        }
    }

    Summary {
        popular_available,
        recommended_domains,
        alternative_suggestions,
        fastest_response: fastest.cloned(),
        slowest_response: slowest.cloned(),
    }
}

/// Alternative `.com` names built from a base name. Always the same five.
pub fn suggestions(base: &str) -> Vec<String> {
    [
        format!("{}app", base),
        format!("{}pro", base),
        format!("{}online", base),
        format!("{}digital", base),
        format!("{}tech", base),
        format!("get{}", base),
        format!("my{}", base),
        format!("{}hub", base),
        format!("{}zone", base),
        format!("{}lab", base),
    ]
    .into_iter()
    .take(SUGGESTION_COUNT)
    .map(|name| format!("{}.com", name))
    .collect()
}
