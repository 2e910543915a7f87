//! In-memory control plane for tests and dry runs

use crate::query::{ControlPlaneQuery, QueryRequest};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Control plane serving canned responses keyed by idempotency key.
///
/// Queries with no canned response return `Ok(None)`, the same shape a
/// real control plane produces when the output path selects nothing.
/// Every query is counted so tests can assert how many physical
/// lookups a caller issued.
pub struct MemoryControlPlane {
    responses: RwLock<HashMap<String, Value>>,
    calls: AtomicUsize,
}

impl MemoryControlPlane {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Register the value a lookup with this idempotency key returns
    pub async fn respond(&self, idempotency_key: impl Into<String>, value: Value) {
        let mut responses = self.responses.write().await;
        responses.insert(idempotency_key.into(), value);
    }

    /// Number of queries served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlPlaneQuery for MemoryControlPlane {
    async fn query(&self, request: &QueryRequest) -> Result<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let responses = self.responses.read().await;
        Ok(responses.get(&request.idempotency_key).cloned())
    }
}
