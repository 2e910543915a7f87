//! Endpoint address discovery & routing bridge
//!
//! This library wires a privately hosted REST service to a public API
//! layer through one interface endpoint:
//! - AddressDiscovery: out-of-band lookup of the endpoint's per-AZ
//!   private addresses
//! - RoutingTableBuilder: target group + listener over those addresses
//! - DomainBinder: private zone under the destination's TLS suffix
//! - endpoint_resource_policy: allow-all / deny-other-endpoints policy
//! - BridgeBuilder: orchestrates the above into one Bridge

pub mod error;
pub mod events;
pub mod provision;
pub mod discovery;
pub mod routing;
pub mod domain;
pub mod policy;
pub mod bridge;

pub use error::{BridgeError, Result};
pub use events::{BridgeEvent, EventSink, LogSink, RecordingSink};
pub use provision::{MemoryProvisioner, Provisioner, TargetGroupSpec};
pub use discovery::AddressDiscovery;
pub use routing::RoutingTableBuilder;
pub use domain::DomainBinder;
pub use policy::endpoint_resource_policy;
pub use bridge::BridgeBuilder;
