//! Routing table construction over discovered addresses

use crate::error::Result;
use crate::events::{BridgeEvent, EventSink};
use crate::provision::{Provisioner, TargetGroupSpec};
use bridge_api::{AddressSnapshot, InterfaceEndpoint, LoadBalancerRef, RoutingTable};
use std::sync::Arc;
use tracing::{debug, info};

/// Port the interface endpoint terminates TLS on
pub const TARGET_PORT: u16 = 443;

/// Builds the target group and listener for one endpoint.
///
/// The build order is a contract: the target group is created first,
/// every discovered address is registered against it, and only then is
/// the listener attached, so the listener never begins forwarding to a
/// half-populated group.
pub struct RoutingTableBuilder {
    provisioner: Arc<dyn Provisioner>,
    events: Arc<dyn EventSink>,
}

impl RoutingTableBuilder {
    pub fn new(provisioner: Arc<dyn Provisioner>, events: Arc<dyn EventSink>) -> Self {
        Self { provisioner, events }
    }

    pub async fn build(
        &self,
        endpoint: &InterfaceEndpoint,
        load_balancer: &LoadBalancerRef,
        snapshot: &AddressSnapshot,
        listener_port: u16,
    ) -> Result<RoutingTable> {
        let spec = TargetGroupSpec {
            name: format!("{}-targets", endpoint.id),
            vpc_id: endpoint.vpc.id.clone(),
            port: TARGET_PORT,
        };
        let target_group_arn = self.provisioner.create_target_group(&spec).await?;

        let targets = snapshot.entries();
        for target in &targets {
            debug!(
                target_group_arn = %target_group_arn,
                address = %target.address,
                az_index = target.az_index,
                "Registering endpoint address as target"
            );
            self.provisioner
                .register_ip_target(&target_group_arn, target.address, TARGET_PORT)
                .await?;
        }

        if targets.is_empty() {
            // Valid but non-functional; deployment proceeds, operators
            // are told.
            self.events.emit(&BridgeEvent::EmptyTargetSet {
                endpoint_id: endpoint.id.clone(),
                target_group_arn: target_group_arn.clone(),
            });
        }

        let listener_arn = self
            .provisioner
            .create_listener(load_balancer, listener_port, &target_group_arn)
            .await?;

        info!(
            endpoint_id = %endpoint.id,
            targets = targets.len(),
            listener_port = listener_port,
            "Routing table built"
        );

        Ok(RoutingTable {
            target_group_arn,
            target_port: TARGET_PORT,
            listener_arn,
            listener_port,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::provision::MemoryProvisioner;
    use bridge_api::VpcRef;

    fn endpoint() -> InterfaceEndpoint {
        InterfaceEndpoint {
            id: "vpce-0abc".to_string(),
            vpc: VpcRef {
                id: "vpc-1".to_string(),
                cidr: "10.0.0.0/16".parse().unwrap(),
            },
            network_interface_ids: vec!["eni-0".to_string(), "eni-1".to_string()],
        }
    }

    fn lb() -> LoadBalancerRef {
        LoadBalancerRef {
            name: "sofa-nlb".to_string(),
            arn: "lb-1".to_string(),
            dns_name: "sofa-nlb.elb.local".to_string(),
        }
    }

    fn snapshot(addresses: &[&str]) -> AddressSnapshot {
        let mut snapshot = AddressSnapshot::new();
        for (index, address) in addresses.iter().enumerate() {
            snapshot.insert(index, address.parse().unwrap());
        }
        snapshot
    }

    #[tokio::test]
    async fn test_registers_every_discovered_address() {
        let provisioner = Arc::new(MemoryProvisioner::new());
        let events = Arc::new(RecordingSink::new());
        let builder = RoutingTableBuilder::new(provisioner.clone(), events.clone());

        let table = builder
            .build(&endpoint(), &lb(), &snapshot(&["10.0.1.5", "10.0.2.9"]), 5001)
            .await
            .unwrap();

        assert_eq!(table.targets.len(), 2);
        assert_eq!(table.target_port, 443);
        assert_eq!(table.listener_port, 5001);
        assert!(!table.is_degraded());

        let targets = provisioner.targets().await;
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.port == 443));
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn test_partial_snapshot_registers_fewer_targets() {
        let provisioner = Arc::new(MemoryProvisioner::new());
        let events = Arc::new(RecordingSink::new());
        let builder = RoutingTableBuilder::new(provisioner.clone(), events);

        let table = builder
            .build(&endpoint(), &lb(), &snapshot(&["10.0.1.5"]), 5001)
            .await
            .unwrap();

        assert_eq!(table.targets.len(), 1);
        assert_eq!(provisioner.listeners().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_snapshot_still_creates_listener() {
        let provisioner = Arc::new(MemoryProvisioner::new());
        let events = Arc::new(RecordingSink::new());
        let builder = RoutingTableBuilder::new(provisioner.clone(), events.clone());

        let table = builder
            .build(&endpoint(), &lb(), &snapshot(&[]), 5001)
            .await
            .unwrap();

        assert!(table.is_degraded());
        assert_eq!(provisioner.listeners().await.len(), 1);
        assert_eq!(
            events.events(),
            vec![BridgeEvent::EmptyTargetSet {
                endpoint_id: "vpce-0abc".to_string(),
                target_group_arn: table.target_group_arn.clone(),
            }]
        );
    }

    #[tokio::test]
    async fn test_listener_attached_after_targets() {
        let provisioner = Arc::new(MemoryProvisioner::new());
        let events = Arc::new(RecordingSink::new());
        let builder = RoutingTableBuilder::new(provisioner.clone(), events);

        let table = builder
            .build(&endpoint(), &lb(), &snapshot(&["10.0.1.5"]), 5001)
            .await
            .unwrap();

        // The listener's default action points at the group the targets
        // were registered in
        let listeners = provisioner.listeners().await;
        assert_eq!(listeners[0].target_group_arn, table.target_group_arn);
        let targets = provisioner.targets().await;
        assert_eq!(targets[0].target_group_arn, table.target_group_arn);
    }
}
