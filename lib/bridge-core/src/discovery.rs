//! Address discovery for interface endpoints
//!
//! The provisioning interface does not expose the private addresses
//! behind an interface endpoint's network interfaces, so they are
//! looked up out-of-band at deploy time, one lookup per availability
//! zone.

use crate::error::Result;
use crate::events::{BridgeEvent, EventSink};
use bridge_api::{AddressSnapshot, InterfaceEndpoint};
use bridge_platform::{ControlPlaneQuery, QueryRequest};
use futures::future;
use serde_json::{json, Value};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Discovers the per-AZ private addresses of an interface endpoint.
///
/// Lookups are independent and issued concurrently, but the snapshot
/// is only assembled once all of them have completed. An index with no
/// interface is left out of the snapshot and reported as a
/// `DiscoveryGap` event; the result is degraded, not failed.
pub struct AddressDiscovery {
    control: Arc<dyn ControlPlaneQuery>,
    events: Arc<dyn EventSink>,
}

impl AddressDiscovery {
    pub fn new(control: Arc<dyn ControlPlaneQuery>, events: Arc<dyn EventSink>) -> Self {
        Self { control, events }
    }

    /// Take a best-effort snapshot of the endpoint's addresses
    pub async fn discover(&self, endpoint: &InterfaceEndpoint) -> Result<AddressSnapshot> {
        let az_count = endpoint.az_count();
        debug!(
            endpoint_id = %endpoint.id,
            az_count = az_count,
            "Discovering endpoint interface addresses"
        );

        let lookups = (0..az_count).map(|az_index| self.lookup(endpoint, az_index));
        let results = future::join_all(lookups).await;

        let mut snapshot = AddressSnapshot::new();
        for (az_index, result) in results.into_iter().enumerate() {
            match result? {
                Some(address) => snapshot.insert(az_index, address),
                None => self.events.emit(&BridgeEvent::DiscoveryGap {
                    endpoint_id: endpoint.id.clone(),
                    az_index,
                }),
            }
        }

        debug!(
            endpoint_id = %endpoint.id,
            discovered = snapshot.len(),
            "Address discovery complete"
        );
        Ok(snapshot)
    }

    async fn lookup(
        &self,
        endpoint: &InterfaceEndpoint,
        az_index: usize,
    ) -> Result<Option<Ipv4Addr>> {
        let output_path = format!("NetworkInterfaces.{az_index}.PrivateIpAddress");
        let request = QueryRequest {
            service: "EC2".to_string(),
            action: "DescribeNetworkInterfaces".to_string(),
            parameters: json!({
                "NetworkInterfaceIds": endpoint.network_interface_ids,
            }),
            output_path,
            // Keyed per endpoint so two bridges never share a lookup
            idempotency_key: lookup_key(&endpoint.id, az_index),
        };

        match self.control.query(&request).await? {
            Some(Value::String(raw)) => match raw.parse::<Ipv4Addr>() {
                Ok(address) => Ok(Some(address)),
                Err(_) => {
                    warn!(
                        endpoint_id = %endpoint.id,
                        az_index = az_index,
                        value = %raw,
                        "Discarding unparseable interface address"
                    );
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }
}

/// Idempotency key used for an endpoint's lookup at one AZ index
pub fn lookup_key(endpoint_id: &str, az_index: usize) -> String {
    format!("{endpoint_id}/NetworkInterfaces.{az_index}.PrivateIpAddress")
}
