//! Private DNS binding for the load balancer

use serde::{Deserialize, Serialize};

/// A private hosted zone and the alias record published inside it.
///
/// The zone name is a literal subdomain of
/// `execute-api.<region>.<platform domain>` so the certificate the
/// destination service presents still validates against the name the
/// client dialled. Resolution only succeeds from inside the VPC the
/// zone is scoped to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomainBinding {
    /// Identifier of the created hosted zone
    pub zone_id: String,

    /// Fully qualified zone name clients dial
    pub zone_name: String,

    /// Canonical load-balancer name the apex alias record points at
    pub alias_target: String,
}
