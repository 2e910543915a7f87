//! Bridge orchestration

use crate::discovery::AddressDiscovery;
use crate::domain::DomainBinder;
use crate::error::{BridgeError, Result};
use crate::events::{EventSink, LogSink};
use crate::policy::endpoint_resource_policy;
use crate::provision::Provisioner;
use crate::routing::RoutingTableBuilder;
use bridge_api::{Bridge, DeployContext, InterfaceEndpoint, LoadBalancerRef};
use bridge_platform::ControlPlaneQuery;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Composes discovery, routing, domain binding and policy into one
/// bridge per interface endpoint.
///
/// Building twice for the same endpoint within one deployment would
/// duplicate target groups, so the builder tracks which endpoints it
/// has bridged and rejects repeats. All created resources are side
/// effects of `build`; redeployment replaces them wholesale rather
/// than patching a live bridge.
pub struct BridgeBuilder {
    ctx: DeployContext,
    control: Arc<dyn ControlPlaneQuery>,
    provisioner: Arc<dyn Provisioner>,
    events: Arc<dyn EventSink>,
    bridged: Mutex<HashSet<String>>,
}

impl BridgeBuilder {
    pub fn new(
        ctx: DeployContext,
        control: Arc<dyn ControlPlaneQuery>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Self {
        Self::with_events(ctx, control, provisioner, Arc::new(LogSink))
    }

    pub fn with_events(
        ctx: DeployContext,
        control: Arc<dyn ControlPlaneQuery>,
        provisioner: Arc<dyn Provisioner>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ctx,
            control,
            provisioner,
            events,
            bridged: Mutex::new(HashSet::new()),
        }
    }

    /// Build the bridge for one endpoint.
    ///
    /// Returns the callable base URL and the resource policy inside the
    /// aggregate; the caller attaches the policy to the private service
    /// and hands the URL to the public gateway.
    pub async fn build(
        &self,
        endpoint: &InterfaceEndpoint,
        load_balancer: &LoadBalancerRef,
        listener_port: u16,
    ) -> Result<Bridge> {
        {
            let mut bridged = self.bridged.lock().await;
            if !bridged.insert(endpoint.id.clone()) {
                return Err(BridgeError::ProvisioningConflict(endpoint.id.clone()));
            }
        }

        let discovery = AddressDiscovery::new(self.control.clone(), self.events.clone());
        let snapshot = discovery.discover(endpoint).await?;

        let routing = RoutingTableBuilder::new(self.provisioner.clone(), self.events.clone())
            .build(endpoint, load_balancer, &snapshot, listener_port)
            .await?;

        let binding = DomainBinder::new(self.ctx.clone(), self.provisioner.clone())
            .bind(load_balancer, &endpoint.vpc)
            .await?;

        let policy = endpoint_resource_policy(&self.ctx, &endpoint.id);

        // The deny condition and the routing table must name the same
        // endpoint; a mismatch is a silent isolation break the platform
        // would never flag.
        match policy.source_endpoint_constraint() {
            Some(pinned) if pinned == endpoint.id => {}
            pinned => {
                return Err(BridgeError::PolicyEndpointMismatch {
                    policy_endpoint: pinned.unwrap_or_default().to_string(),
                    routed_endpoint: endpoint.id.clone(),
                });
            }
        }

        let base_url = format!("https://{}:{}", binding.zone_name, listener_port);
        let deployment_id = Uuid::new_v4();

        info!(
            deployment_id = %deployment_id,
            endpoint_id = %endpoint.id,
            base_url = %base_url,
            targets = routing.targets.len(),
            "Bridge built"
        );

        Ok(Bridge {
            deployment_id,
            endpoint_id: endpoint.id.clone(),
            base_url,
            routing,
            binding,
            policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::lookup_key;
    use crate::events::{BridgeEvent, RecordingSink};
    use crate::provision::MemoryProvisioner;
    use bridge_api::policy::{Effect, INVOKE_ACTION};
    use bridge_api::{AccessRequest, VpcRef};
    use bridge_platform::MemoryControlPlane;
    use serde_json::json;

    fn ctx() -> DeployContext {
        DeployContext::new("sofa", "eu-west-2", "111122223333")
    }

    fn endpoint(interfaces: usize) -> InterfaceEndpoint {
        InterfaceEndpoint {
            id: "vpce-0abc".to_string(),
            vpc: VpcRef {
                id: "vpc-1".to_string(),
                cidr: "10.0.0.0/16".parse().unwrap(),
            },
            network_interface_ids: (0..interfaces).map(|i| format!("eni-{i}")).collect(),
        }
    }

    fn lb(name: &str) -> LoadBalancerRef {
        LoadBalancerRef {
            name: name.to_string(),
            arn: "lb-1".to_string(),
            dns_name: "sofa-nlb.elb.local".to_string(),
        }
    }

    struct Harness {
        control: Arc<MemoryControlPlane>,
        provisioner: Arc<MemoryProvisioner>,
        events: Arc<RecordingSink>,
        builder: BridgeBuilder,
    }

    fn harness() -> Harness {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();

        let control = Arc::new(MemoryControlPlane::new());
        let provisioner = Arc::new(MemoryProvisioner::new());
        let events = Arc::new(RecordingSink::new());
        let builder = BridgeBuilder::with_events(
            ctx(),
            control.clone(),
            provisioner.clone(),
            events.clone(),
        );
        Harness {
            control,
            provisioner,
            events,
            builder,
        }
    }

    #[tokio::test]
    async fn test_two_az_bridge_end_to_end() {
        let h = harness();
        h.control.respond(lookup_key("vpce-0abc", 0), json!("10.0.1.5")).await;
        h.control.respond(lookup_key("vpce-0abc", 1), json!("10.0.2.9")).await;

        let bridge = h
            .builder
            .build(&endpoint(2), &lb("sofa-nlb"), 5001)
            .await
            .unwrap();

        assert_eq!(
            bridge.base_url,
            "https://sofa-nlb.execute-api.eu-west-2.amazonaws.com:5001"
        );
        assert_eq!(bridge.routing.targets.len(), 2);
        assert_eq!(bridge.routing.listener_port, 5001);
        assert_eq!(h.provisioner.targets().await.len(), 2);
        assert_eq!(h.provisioner.listeners().await[0].port, 5001);
        assert!(h.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_discovery_gap_degrades_but_deploys() {
        let h = harness();
        h.control.respond(lookup_key("vpce-0abc", 0), json!("10.0.1.5")).await;
        // AZ 1 has no interface

        let bridge = h
            .builder
            .build(&endpoint(2), &lb("sofa-nlb"), 5001)
            .await
            .unwrap();

        assert_eq!(bridge.routing.targets.len(), 1);
        assert_eq!(
            h.events.events(),
            vec![BridgeEvent::DiscoveryGap {
                endpoint_id: "vpce-0abc".to_string(),
                az_index: 1,
            }]
        );
        assert_eq!(h.provisioner.listeners().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_lb_name_fails_before_dns() {
        let h = harness();
        h.control.respond(lookup_key("vpce-0abc", 0), json!("10.0.1.5")).await;

        let error = h
            .builder
            .build(&endpoint(1), &lb("sofa_nlb!"), 5001)
            .await
            .unwrap_err();

        assert!(matches!(error, BridgeError::DomainMismatch { .. }));
        assert!(h.provisioner.zones().await.is_empty());
        assert!(h.provisioner.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_second_bridge_for_endpoint_conflicts() {
        let h = harness();
        h.control.respond(lookup_key("vpce-0abc", 0), json!("10.0.1.5")).await;

        h.builder
            .build(&endpoint(1), &lb("sofa-nlb"), 5001)
            .await
            .unwrap();
        let error = h
            .builder
            .build(&endpoint(1), &lb("sofa-nlb"), 5001)
            .await
            .unwrap_err();

        assert!(matches!(error, BridgeError::ProvisioningConflict(id) if id == "vpce-0abc"));
        // No second target group was created
        assert_eq!(h.provisioner.target_groups().await.len(), 1);
    }

    #[tokio::test]
    async fn test_policy_pins_routed_endpoint() {
        let h = harness();
        h.control.respond(lookup_key("vpce-0abc", 0), json!("10.0.1.5")).await;

        let bridge = h
            .builder
            .build(&endpoint(1), &lb("sofa-nlb"), 5001)
            .await
            .unwrap();

        assert_eq!(
            bridge.policy.source_endpoint_constraint(),
            Some(bridge.endpoint_id.as_str())
        );

        let through_endpoint = AccessRequest {
            action: INVOKE_ACTION.to_string(),
            resource: "arn:aws:execute-api:eu-west-2:111122223333:abc/prod/GET/orders"
                .to_string(),
            source_endpoint: Some("vpce-0abc".to_string()),
        };
        assert_eq!(bridge.policy.evaluate(&through_endpoint), Effect::Allow);
    }

    #[tokio::test]
    async fn test_zero_interfaces_builds_degraded_bridge() {
        let h = harness();

        let bridge = h
            .builder
            .build(&endpoint(0), &lb("sofa-nlb"), 5001)
            .await
            .unwrap();

        assert!(bridge.routing.is_degraded());
        assert_eq!(
            h.events.events(),
            vec![BridgeEvent::EmptyTargetSet {
                endpoint_id: "vpce-0abc".to_string(),
                target_group_arn: bridge.routing.target_group_arn.clone(),
            }]
        );
    }
}
