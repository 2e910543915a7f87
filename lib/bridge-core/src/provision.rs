//! Boundary to the declarative provisioning collaborator
//!
//! The bridge never talks to the platform's provisioning engine
//! directly; it declares resources through this trait and lets the
//! collaborator realize them. `MemoryProvisioner` realizes them into
//! process memory instead, which is what the tests and dry runs use.

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use bridge_api::LoadBalancerRef;
use std::net::Ipv4Addr;
use tokio::sync::RwLock;
use tracing::debug;

/// Specification of a target group to create
#[derive(Clone, Debug)]
pub struct TargetGroupSpec {
    pub name: String,
    pub vpc_id: String,
    /// Port the registered targets terminate on
    pub port: u16,
}

/// Provisioning primitives the bridge consumes.
///
/// Ordering is part of the contract, not an artifact of call order:
/// `create_listener` requires the target group identifier returned by
/// `create_target_group`, and implementations must reject identifiers
/// they did not issue.
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn create_target_group(&self, spec: &TargetGroupSpec) -> Result<String>;

    async fn register_ip_target(
        &self,
        target_group_arn: &str,
        address: Ipv4Addr,
        port: u16,
    ) -> Result<()>;

    async fn create_listener(
        &self,
        load_balancer: &LoadBalancerRef,
        port: u16,
        target_group_arn: &str,
    ) -> Result<String>;

    async fn create_private_zone(&self, zone_name: &str, vpc_id: &str) -> Result<String>;

    async fn create_alias_record(
        &self,
        zone_id: &str,
        record_name: &str,
        alias_target: &str,
    ) -> Result<()>;
}

/// A target group realized in memory
#[derive(Clone, Debug)]
pub struct CreatedTargetGroup {
    pub arn: String,
    pub name: String,
    pub vpc_id: String,
    pub port: u16,
}

/// A registered target
#[derive(Clone, Debug)]
pub struct CreatedTarget {
    pub target_group_arn: String,
    pub address: Ipv4Addr,
    pub port: u16,
}

/// A listener realized in memory
#[derive(Clone, Debug)]
pub struct CreatedListener {
    pub arn: String,
    pub load_balancer_arn: String,
    pub port: u16,
    pub target_group_arn: String,
}

/// A private hosted zone realized in memory
#[derive(Clone, Debug)]
pub struct CreatedZone {
    pub id: String,
    pub name: String,
    pub vpc_id: String,
}

/// An alias record realized in memory
#[derive(Clone, Debug)]
pub struct CreatedRecord {
    pub zone_id: String,
    pub name: String,
    pub alias_target: String,
}

#[derive(Default)]
struct MemoryState {
    target_groups: Vec<CreatedTargetGroup>,
    targets: Vec<CreatedTarget>,
    listeners: Vec<CreatedListener>,
    zones: Vec<CreatedZone>,
    records: Vec<CreatedRecord>,
}

/// Provisioner that records every declared resource in memory.
///
/// Enforces the ordering contract: a listener or target registration
/// naming an unknown target group, or a record naming an unknown zone,
/// is rejected.
#[derive(Default)]
pub struct MemoryProvisioner {
    state: RwLock<MemoryState>,
}

impl MemoryProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn target_groups(&self) -> Vec<CreatedTargetGroup> {
        self.state.read().await.target_groups.clone()
    }

    pub async fn targets(&self) -> Vec<CreatedTarget> {
        self.state.read().await.targets.clone()
    }

    pub async fn listeners(&self) -> Vec<CreatedListener> {
        self.state.read().await.listeners.clone()
    }

    pub async fn zones(&self) -> Vec<CreatedZone> {
        self.state.read().await.zones.clone()
    }

    pub async fn records(&self) -> Vec<CreatedRecord> {
        self.state.read().await.records.clone()
    }
}

#[async_trait]
impl Provisioner for MemoryProvisioner {
    async fn create_target_group(&self, spec: &TargetGroupSpec) -> Result<String> {
        let mut state = self.state.write().await;
        let arn = format!("tg-{}", state.target_groups.len() + 1);
        debug!(arn = %arn, name = %spec.name, "Created target group");
        state.target_groups.push(CreatedTargetGroup {
            arn: arn.clone(),
            name: spec.name.clone(),
            vpc_id: spec.vpc_id.clone(),
            port: spec.port,
        });
        Ok(arn)
    }

    async fn register_ip_target(
        &self,
        target_group_arn: &str,
        address: Ipv4Addr,
        port: u16,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.target_groups.iter().any(|tg| tg.arn == target_group_arn) {
            return Err(BridgeError::Provision(format!(
                "unknown target group: {target_group_arn}"
            )));
        }
        state.targets.push(CreatedTarget {
            target_group_arn: target_group_arn.to_string(),
            address,
            port,
        });
        Ok(())
    }

    async fn create_listener(
        &self,
        load_balancer: &LoadBalancerRef,
        port: u16,
        target_group_arn: &str,
    ) -> Result<String> {
        let mut state = self.state.write().await;
        if !state.target_groups.iter().any(|tg| tg.arn == target_group_arn) {
            return Err(BridgeError::Provision(format!(
                "listener references unknown target group: {target_group_arn}"
            )));
        }
        let arn = format!("listener-{}", state.listeners.len() + 1);
        debug!(arn = %arn, port = port, "Created listener");
        state.listeners.push(CreatedListener {
            arn: arn.clone(),
            load_balancer_arn: load_balancer.arn.clone(),
            port,
            target_group_arn: target_group_arn.to_string(),
        });
        Ok(arn)
    }

    async fn create_private_zone(&self, zone_name: &str, vpc_id: &str) -> Result<String> {
        let mut state = self.state.write().await;
        let id = format!("zone-{}", state.zones.len() + 1);
        debug!(id = %id, name = %zone_name, "Created private hosted zone");
        state.zones.push(CreatedZone {
            id: id.clone(),
            name: zone_name.to_string(),
            vpc_id: vpc_id.to_string(),
        });
        Ok(id)
    }

    async fn create_alias_record(
        &self,
        zone_id: &str,
        record_name: &str,
        alias_target: &str,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.zones.iter().any(|zone| zone.id == zone_id) {
            return Err(BridgeError::Provision(format!(
                "record references unknown zone: {zone_id}"
            )));
        }
        state.records.push(CreatedRecord {
            zone_id: zone_id.to_string(),
            name: record_name.to_string(),
            alias_target: alias_target.to_string(),
        });
        Ok(())
    }
}
