//! Live progress for all-extensions checks.
//!
//! A [`Session`] serves one subscriber over a pair of channels carrying JSON
//! text frames. The transport (WebSocket, stdio, ...) is up to the caller.
//!
//! Frames sent for one check are ordered: `bulk_check_started`, then one
//! `bulk_check_progress` per completed probe, then exactly one
//! `bulk_check_complete`.

use crate::concurrent::{ConcurrentProcessor, ProbeOutcome};
use crate::extensions::ExtensionRegistry;
use crate::types::{Availability, ProgressSnapshot};
use crate::utils::sanitize_base_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Payload of `bulk_check_started`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckStarted {
    pub domain_name: String,
    pub total_extensions: usize,
}

/// Frames sent to the subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected { message: String },
    Pong { data: i64 },
    Error { message: String },
    BulkCheckStarted { data: CheckStarted },
    BulkCheckProgress { data: ProgressSnapshot },
    BulkCheckComplete { data: ProgressSnapshot },
}

impl ServerMessage {
    pub fn error<M: Into<String>>(message: M) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Frame received from the subscriber, before dispatch on `type`.
#[derive(Debug, Deserialize)]
struct ClientFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Folds probe outcomes into progress snapshots.
#[derive(Debug)]
pub struct ProgressTracker {
    snapshot: ProgressSnapshot,
    started: Instant,
}

impl ProgressTracker {
    pub fn new<S: Into<String>>(domain_name: S, total_extensions: usize) -> Self {
        Self {
            snapshot: ProgressSnapshot {
                domain_name: domain_name.into(),
                total_extensions,
                checked_count: 0,
                available_count: 0,
                unavailable_count: 0,
                error_count: 0,
                current_domain: None,
                available_domains: Vec::new(),
                unavailable_domains: Vec::new(),
                is_complete: false,
                total_time_ms: 0,
            },
            started: Instant::now(),
        }
    }

    /// Account for one outcome and return the resulting full snapshot.
    pub fn apply(&mut self, outcome: &ProbeOutcome) -> ProgressSnapshot {
        let snap = &mut self.snapshot;
        snap.checked_count += 1;

        match outcome {
            ProbeOutcome::Completed(result) => {
                match result.status {
                    Availability::Available => {
                        snap.available_count += 1;
                        snap.available_domains.push(result.clone());
                    }
                    Availability::Registered => {
                        snap.unavailable_count += 1;
                        snap.unavailable_domains.push(result.clone());
                    }
                    Availability::Error => snap.error_count += 1,
                }
                snap.current_domain = Some(result.clone());
            }
            ProbeOutcome::Failed { .. } => snap.error_count += 1,
        }

        snap.total_time_ms = self.started.elapsed().as_millis() as u64;
        snap.clone()
    }

    /// Mark the check complete and return the final snapshot.
    pub fn finish(&mut self) -> ProgressSnapshot {
        self.snapshot.is_complete = true;
        self.snapshot.current_domain = None;
        self.snapshot.total_time_ms = self.started.elapsed().as_millis() as u64;
        self.snapshot.clone()
    }

    pub fn snapshot(&self) -> &ProgressSnapshot {
        &self.snapshot
    }
}

/// One live subscriber.
pub struct Session {
    registry: Arc<ExtensionRegistry>,
    processor: ConcurrentProcessor,
}

impl Session {
    pub fn new(registry: Arc<ExtensionRegistry>, processor: ConcurrentProcessor) -> Self {
        Self {
            registry,
            processor,
        }
    }

    /// Serve the subscriber until `inbound` closes.
    ///
    /// Checks started by the subscriber keep running after it goes away;
    /// their frames are dropped but their results still reach the ledger.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<String>,
        outbound: mpsc::UnboundedSender<String>,
    ) {
        send(
            &outbound,
            &ServerMessage::Connected {
                message: "connection established".to_string(),
            },
        );

        while let Some(text) = inbound.recv().await {
            self.handle_frame(&text, &outbound);
        }

        tracing::debug!("subscriber disconnected");
    }

    fn handle_frame(&self, text: &str, outbound: &mpsc::UnboundedSender<String>) {
        let frame: ClientFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "unparsable client frame");
                send(outbound, &ServerMessage::error("Invalid message format"));
                return;
            }
        };

        match frame.kind.as_str() {
            "ping" => send(
                outbound,
                &ServerMessage::Pong {
                    data: chrono::Utc::now().timestamp(),
                },
            ),
            "check_all_extensions" => self.start_check(frame.data, outbound),
            other => {
                tracing::debug!(kind = other, "unknown client frame type");
                send(outbound, &ServerMessage::error("Unknown message type"));
            }
        }
    }

    fn start_check(&self, data: Option<Value>, outbound: &mpsc::UnboundedSender<String>) {
        let Some(Value::Object(data)) = data else {
            send(outbound, &ServerMessage::error("Invalid message format"));
            return;
        };

        let raw = match data.get("domain_name").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                send(outbound, &ServerMessage::error("Domain name is required"));
                return;
            }
        };

        let base = match sanitize_base_name(raw) {
            Ok(base) => base,
            Err(e) => {
                send(outbound, &ServerMessage::error(e.to_string()));
                return;
            }
        };

        let candidates: Vec<String> = self
            .registry
            .list()
            .into_iter()
            .map(|ext| format!("{}{}", base, ext))
            .collect();
        let total = candidates.len();

        send(
            outbound,
            &ServerMessage::BulkCheckStarted {
                data: CheckStarted {
                    domain_name: base.clone(),
                    total_extensions: total,
                },
            },
        );

        let mut rx = self.processor.stream(candidates);
        let outbound = outbound.clone();
        tokio::spawn(async move {
            let mut tracker = ProgressTracker::new(&base, total);
            while let Some(outcome) = rx.recv().await {
                let snapshot = tracker.apply(&outcome);
                send(&outbound, &ServerMessage::BulkCheckProgress { data: snapshot });
            }

            let done = tracker.finish();
            tracing::info!(
                domain = %base,
                total,
                available = done.available_count,
                "live check complete"
            );
            send(&outbound, &ServerMessage::BulkCheckComplete { data: done });
        });
    }
}

/// Serialize and enqueue a frame. A gone subscriber is not an error.
fn send(outbound: &mpsc::UnboundedSender<String>, message: &ServerMessage) {
    match serde_json::to_string(message) {
        Ok(text) => {
            let _ = outbound.send(text);
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode server frame"),
    }
}
