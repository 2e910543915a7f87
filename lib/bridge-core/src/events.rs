//! Structured events for degraded-but-valid outcomes
//!
//! A bridge can deploy successfully while serving fewer targets than
//! availability zones. Nothing in the deployed topology distinguishes
//! that from a full deployment, so the degraded cases are surfaced as
//! explicit events rather than left undetectable.

use serde::Serialize;
use std::sync::Mutex;
use tracing::warn;

/// Warning-level conditions observed while building a bridge
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BridgeEvent {
    /// A control-plane lookup found no interface at an AZ index; the
    /// routing table will carry one fewer target
    DiscoveryGap { endpoint_id: String, az_index: usize },

    /// Every lookup came back empty; the listener exists but forwards
    /// to nothing
    EmptyTargetSet {
        endpoint_id: String,
        target_group_arn: String,
    },
}

/// Sink for bridge events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &BridgeEvent);
}

/// Sink that forwards events to the tracing subscriber at warn level
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &BridgeEvent) {
        match event {
            BridgeEvent::DiscoveryGap {
                endpoint_id,
                az_index,
            } => {
                warn!(
                    endpoint_id = %endpoint_id,
                    az_index = az_index,
                    "No interface address discovered for availability zone"
                );
            }
            BridgeEvent::EmptyTargetSet {
                endpoint_id,
                target_group_arn,
            } => {
                warn!(
                    endpoint_id = %endpoint_id,
                    target_group_arn = %target_group_arn,
                    "Target group has no targets; listener will forward to nothing"
                );
            }
        }
    }
}

/// Sink that stores events for later assertion
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<BridgeEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().expect("event lock poisoned").clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &BridgeEvent) {
        self.events
            .lock()
            .expect("event lock poisoned")
            .push(event.clone());
    }
}
