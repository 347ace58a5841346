//! Concurrent processing utilities for domain checking.
//!
//! This module fans a list of candidate names out to the prober with a fixed
//! concurrency cap and collects outcomes in completion order. A candidate that
//! fails never aborts its siblings.

use crate::error::DomainProbeError;
use crate::history::HistoryLedger;
use crate::resolver::Prober;
use crate::types::{CandidateFailure, ProbeResult};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Outcome of one dispatched candidate.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// The probe ran to completion, whatever its classification
    Completed(ProbeResult),

    /// No result could be produced for the candidate
    Failed {
        candidate: String,
        error: DomainProbeError,
    },
}

/// Everything a batch produced, in completion order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: Vec<ProbeResult>,
    pub failures: Vec<CandidateFailure>,

    /// First failure observed, in completion order
    pub first_error: Option<DomainProbeError>,
}

impl BatchOutcome {
    /// Number of candidates that were dispatched.
    pub fn total(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    fn push(&mut self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Completed(result) => self.results.push(result),
            ProbeOutcome::Failed { candidate, error } => {
                self.failures.push(CandidateFailure {
                    domain: candidate,
                    error: error.to_string(),
                });
                if self.first_error.is_none() {
                    self.first_error = Some(error);
                }
            }
        }
    }

    /// Turn partial failure into an error, keeping the first cause.
    pub fn into_result(self) -> Result<Vec<ProbeResult>, DomainProbeError> {
        match self.first_error {
            None => Ok(self.results),
            Some(first) => Err(DomainProbeError::PartialBatchFailure {
                failed: self.failures.len(),
                total: self.results.len() + self.failures.len(),
                first: Box::new(first),
            }),
        }
    }
}

/// Manages concurrent domain checking operations.
#[derive(Clone)]
pub struct ConcurrentProcessor {
    prober: Arc<Prober>,
    ledger: Option<Arc<HistoryLedger>>,
    max_concurrency: usize,
}

impl ConcurrentProcessor {
    /// Create a processor running at most `max_concurrency` probes at once.
    pub fn new(prober: Arc<Prober>, max_concurrency: usize) -> Self {
        Self {
            prober,
            ledger: None,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Record every completed probe into `ledger` as it finishes.
    pub fn with_ledger(mut self, ledger: Arc<HistoryLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Check every candidate and wait for all of them.
    ///
    /// Results come back in completion order, not input order. Empty input
    /// yields an empty outcome without spawning anything.
    pub async fn check_many(&self, candidates: Vec<String>) -> BatchOutcome {
        let total = candidates.len();
        let started = std::time::Instant::now();

        let mut outcome = BatchOutcome::default();
        if total == 0 {
            return outcome;
        }

        let mut rx = self.stream(candidates);
        while let Some(item) = rx.recv().await {
            outcome.push(item);
        }

        tracing::info!(
            total,
            completed = outcome.results.len(),
            failed = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        outcome
    }

    /// Check every candidate, yielding outcomes as they complete.
    ///
    /// The channel holds one slot per candidate so no probe ever waits on a
    /// slow consumer. It closes once every probe has finished.
    pub fn stream(&self, candidates: Vec<String>) -> mpsc::Receiver<ProbeOutcome> {
        let (tx, rx) = mpsc::channel(candidates.len().max(1));
        if candidates.is_empty() {
            return rx;
        }

        let permits = self.max_concurrency.min(candidates.len());
        let semaphore = Arc::new(Semaphore::new(permits));
        let prober = Arc::clone(&self.prober);
        let ledger = self.ledger.clone();

        tracing::debug!(candidates = candidates.len(), permits, "dispatching probes");

        tokio::spawn(async move {
            for candidate in candidates {
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let error = DomainProbeError::dispatch(&candidate, "admission gate closed");
                        let _ = tx.send(ProbeOutcome::Failed { candidate, error }).await;
                        continue;
                    }
                };

                let tx = tx.clone();
                let prober = Arc::clone(&prober);
                let ledger = ledger.clone();

                tokio::spawn(async move {
                    let _permit = permit;

                    // The probe runs in its own task so that a panic surfaces
                    // here as a JoinError instead of losing the candidate.
                    let name = candidate.clone();
                    let probe = tokio::spawn(async move { prober.probe(&name).await });

                    let outcome = match probe.await {
                        Ok(Ok(result)) => {
                            if let Some(ledger) = &ledger {
                                ledger.record(result.clone());
                            }
                            ProbeOutcome::Completed(result)
                        }
                        Ok(Err(error)) => ProbeOutcome::Failed { candidate, error },
                        Err(join_error) => {
                            tracing::warn!(
                                domain = %candidate,
                                error = %join_error,
                                "probe task failed"
                            );
                            let error =
                                DomainProbeError::dispatch(&candidate, join_error.to_string());
                            ProbeOutcome::Failed { candidate, error }
                        }
                    };

                    // Capacity equals the candidate count, so this never waits.
                    // A closed receiver means nobody is listening any more.
                    let _ = tx.send(outcome).await;
                });
            }
        });

        rx
    }
}
