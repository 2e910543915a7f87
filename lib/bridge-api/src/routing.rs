//! Routing table wiring a listener to discovered endpoint addresses

use crate::endpoint::DiscoveredAddress;
use serde::{Deserialize, Serialize};

/// The load-balancer wiring built for one interface endpoint.
///
/// Created whole at deployment time and never mutated in place:
/// redeployment replaces the entire table (target group and listener)
/// rather than patching targets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingTable {
    /// Identifier of the created target group
    pub target_group_arn: String,

    /// Port the targets terminate on (the destination's TLS port)
    pub target_port: u16,

    /// Identifier of the created listener
    pub listener_arn: String,

    /// Externally dialled port bound to the target group
    pub listener_port: u16,

    /// Addresses registered as targets, one per discovered AZ
    pub targets: Vec<DiscoveredAddress>,
}

impl RoutingTable {
    /// Whether the table has no registered targets.
    ///
    /// A target-less table is valid but non-functional; the builder
    /// emits a warning event when it produces one.
    pub fn is_degraded(&self) -> bool {
        self.targets.is_empty()
    }
}
