//! The bridge aggregate returned to callers

use crate::domain::DomainBinding;
use crate::policy::AccessPolicyDocument;
use crate::routing::RoutingTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything built for one interface endpoint.
///
/// A bridge owns its routing table, domain binding and policy; nothing
/// here is shared with other bridges. Callers pass `base_url` and the
/// endpoint id onward as opaque configuration and attach `policy` to
/// the private service's access configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bridge {
    /// Unique id for this construction, for correlating log events
    pub deployment_id: Uuid,

    /// Endpoint the bridge routes and pins traffic to
    pub endpoint_id: String,

    /// `https://<zone name>:<listener port>`
    pub base_url: String,

    pub routing: RoutingTable,

    pub binding: DomainBinding,

    pub policy: AccessPolicyDocument,
}
