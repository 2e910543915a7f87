//! Idempotency-key caching for control-plane lookups

use crate::query::{ControlPlaneQuery, QueryRequest};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Wrapper that deduplicates lookups by idempotency key.
///
/// A lookup result is keyed by the request's idempotency key; repeated
/// queries with the same key return the stored result without touching
/// the control plane again. This is what makes a lookup a stable
/// resource rather than a fresh call on every pass.
pub struct IdempotentQueries {
    inner: Arc<dyn ControlPlaneQuery>,
    cache: RwLock<HashMap<String, Option<Value>>>,
}

impl IdempotentQueries {
    pub fn new(inner: Arc<dyn ControlPlaneQuery>) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ControlPlaneQuery for IdempotentQueries {
    async fn query(&self, request: &QueryRequest) -> Result<Option<Value>> {
        {
            let cache = self.cache.read().await;
            if let Some(value) = cache.get(&request.idempotency_key) {
                debug!(key = %request.idempotency_key, "Reusing cached lookup");
                return Ok(value.clone());
            }
        }

        let value = self.inner.query(request).await?;

        let mut cache = self.cache.write().await;
        cache.insert(request.idempotency_key.clone(), value.clone());
        Ok(value)
    }
}
