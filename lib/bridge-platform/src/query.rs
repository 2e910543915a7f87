//! The control-plane query capability

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One out-of-band lookup against the platform control plane.
///
/// The idempotency key names the physical lookup: two requests with
/// the same key describe the same lookup resource, and implementations
/// or wrappers may satisfy the second from the first's result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Control-plane service to address, e.g. `EC2`
    pub service: String,

    /// API action to invoke, e.g. `DescribeNetworkInterfaces`
    pub action: String,

    /// Action parameters, in the shape the action expects
    pub parameters: Value,

    /// Dotted path selecting the scalar to extract from the response,
    /// e.g. `NetworkInterfaces.0.PrivateIpAddress`
    pub output_path: String,

    /// Stable identity of this lookup across deployments
    pub idempotency_key: String,
}

/// Capability to query the platform control plane outside the
/// declarative provisioning graph.
///
/// `Ok(None)` means the call succeeded but the output path selected
/// nothing, e.g. fewer network interfaces exist than the caller asked
/// about. That is a degraded result for the caller to absorb, not an
/// error.
#[async_trait]
pub trait ControlPlaneQuery: Send + Sync {
    async fn query(&self, request: &QueryRequest) -> Result<Option<Value>>;
}

/// Walk a dotted output path through a response document.
///
/// Numeric segments index into arrays; all other segments are object
/// keys.
pub fn extract_output(response: &Value, path: &str) -> Option<Value> {
    let mut current = response;
    for segment in path.split('.') {
        current = match (current, segment.parse::<usize>()) {
            (Value::Array(items), Ok(index)) => items.get(index)?,
            (Value::Object(map), _) => map.get(segment)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_nested_scalar() {
        let response = json!({
            "NetworkInterfaces": [
                { "PrivateIpAddress": "10.0.1.5" },
                { "PrivateIpAddress": "10.0.2.9" },
            ]
        });

        assert_eq!(
            extract_output(&response, "NetworkInterfaces.1.PrivateIpAddress"),
            Some(json!("10.0.2.9"))
        );
    }

    #[test]
    fn test_extract_missing_index() {
        let response = json!({
            "NetworkInterfaces": [
                { "PrivateIpAddress": "10.0.1.5" },
            ]
        });

        assert_eq!(
            extract_output(&response, "NetworkInterfaces.1.PrivateIpAddress"),
            None
        );
    }

    #[test]
    fn test_extract_missing_key() {
        let response = json!({ "Reservations": [] });
        assert_eq!(extract_output(&response, "NetworkInterfaces.0"), None);
    }
}
