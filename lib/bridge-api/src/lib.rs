//! Data model for the endpoint address discovery & routing bridge
//!
//! This library defines the resources exchanged between the bridge
//! components:
//! - DeployContext: explicit deployment configuration (no ambient state)
//! - InterfaceEndpoint / LoadBalancerRef: references to platform resources
//! - AddressSnapshot: per-AZ private addresses discovered at deploy time
//! - RoutingTable: target group + listener wiring for one endpoint
//! - DomainBinding: private zone and alias record under the TLS suffix
//! - AccessPolicyDocument: allow/deny policy evaluated by the platform
//! - Bridge: the aggregate handed back to callers

pub mod context;
pub mod endpoint;
pub mod routing;
pub mod domain;
pub mod policy;
pub mod bridge;

pub use context::DeployContext;
pub use endpoint::{AddressSnapshot, DiscoveredAddress, InterfaceEndpoint, LoadBalancerRef, VpcRef};
pub use routing::RoutingTable;
pub use domain::DomainBinding;
pub use policy::{AccessPolicyDocument, AccessRequest, Effect, Statement};
pub use bridge::Bridge;
