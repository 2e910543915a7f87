use bridge_platform::PlatformError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Fatal bridge construction failures.
///
/// Discovery gaps are deliberately absent: a lookup that finds no
/// interface degrades the routing table and emits a warning event
/// instead of failing the deployment. Everything here aborts the whole
/// bridge so the deployment fails rather than leaving a half-wired
/// bridge live.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Zone name {zone_name:?} cannot serve the destination certificate: {reason}")]
    DomainMismatch { zone_name: String, reason: String },

    #[error("Policy pins endpoint {policy_endpoint:?} but routing serves {routed_endpoint:?}")]
    PolicyEndpointMismatch {
        policy_endpoint: String,
        routed_endpoint: String,
    },

    #[error("A bridge was already built for endpoint {0} in this deployment")]
    ProvisioningConflict(String),

    #[error("Control plane error: {0}")]
    ControlPlane(#[from] PlatformError),

    #[error("Provisioning failed: {0}")]
    Provision(String),
}
