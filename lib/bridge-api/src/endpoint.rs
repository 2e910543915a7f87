//! References to platform network resources and discovered addresses

use chrono::{DateTime, Utc};
use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Reference to the virtual network a deployment runs in
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VpcRef {
    /// Platform identifier of the VPC
    pub id: String,

    /// Address space of the VPC
    pub cidr: Ipv4Network,
}

/// Reference to an interface endpoint.
///
/// The endpoint owns one network interface per availability zone. It
/// never owns the interfaces' private addresses: the platform can
/// replace interfaces over the endpoint's lifetime, so addresses are
/// looked up at deploy time rather than stored here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterfaceEndpoint {
    /// Platform identifier of the endpoint (e.g. `vpce-0abc...`)
    pub id: String,

    /// VPC the endpoint is attached to
    pub vpc: VpcRef,

    /// Network interface ids, one per availability zone
    #[serde(default)]
    pub network_interface_ids: Vec<String>,
}

impl InterfaceEndpoint {
    /// Number of availability zones the endpoint spans
    pub fn az_count(&self) -> usize {
        self.network_interface_ids.len()
    }
}

/// Reference to the network load balancer fronting the bridge
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadBalancerRef {
    /// Name of the load balancer; becomes the leftmost DNS label of the
    /// published zone, so it must be a valid DNS label
    pub name: String,

    /// Platform identifier of the load balancer
    pub arn: String,

    /// Canonical DNS name of the load balancer, used as the alias target
    pub dns_name: String,
}

/// A single discovered (AZ index, private address) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredAddress {
    pub az_index: usize,
    pub address: Ipv4Addr,
}

/// Best-effort snapshot of the endpoint's per-AZ private addresses.
///
/// Recomputed on every deployment and never persisted: the platform
/// offers no synchronous consistency between endpoint creation and
/// interface address assignment, so staleness is accepted. At most one
/// address exists per AZ index; indexes with no interface are simply
/// absent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressSnapshot {
    addresses: BTreeMap<usize, Ipv4Addr>,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}

impl AddressSnapshot {
    pub fn new() -> Self {
        Self {
            addresses: BTreeMap::new(),
            taken_at: Utc::now(),
        }
    }

    /// Record the address discovered at an AZ index
    pub fn insert(&mut self, az_index: usize, address: Ipv4Addr) {
        self.addresses.insert(az_index, address);
    }

    pub fn get(&self, az_index: usize) -> Option<Ipv4Addr> {
        self.addresses.get(&az_index).copied()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Discovered addresses in AZ-index order
    pub fn entries(&self) -> Vec<DiscoveredAddress> {
        self.addresses
            .iter()
            .map(|(az_index, address)| DiscoveredAddress {
                az_index: *az_index,
                address: *address,
            })
            .collect()
    }

    /// AZ indexes that produced no address, given the expected AZ count
    pub fn gaps(&self, az_count: usize) -> Vec<usize> {
        (0..az_count)
            .filter(|index| !self.addresses.contains_key(index))
            .collect()
    }
}

impl Default for AddressSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
