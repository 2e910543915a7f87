//! Private DNS binding under the destination's certificate suffix

use crate::error::{BridgeError, Result};
use crate::provision::Provisioner;
use bridge_api::{DeployContext, DomainBinding, LoadBalancerRef, VpcRef};
use std::sync::Arc;
use tracing::info;

/// Publishes a private zone whose name the destination's TLS
/// certificate covers.
///
/// The destination terminates TLS under
/// `*.execute-api.<region>.<platform domain>`, so the zone must be a
/// direct subdomain of that suffix: correct routing under any other
/// name still fails certificate validation at every client. A name
/// that cannot form such a zone is rejected before anything is
/// created.
pub struct DomainBinder {
    ctx: DeployContext,
    provisioner: Arc<dyn Provisioner>,
}

impl DomainBinder {
    pub fn new(ctx: DeployContext, provisioner: Arc<dyn Provisioner>) -> Self {
        Self { ctx, provisioner }
    }

    /// Derive the zone name for a load balancer, without creating it
    pub fn zone_name(&self, load_balancer: &LoadBalancerRef) -> Result<String> {
        let zone_name = format!("{}.{}", load_balancer.name, self.ctx.execute_api_suffix());

        validate_dns_label(&load_balancer.name).map_err(|reason| {
            BridgeError::DomainMismatch {
                zone_name: zone_name.clone(),
                reason,
            }
        })?;

        // The certificate only covers names directly under the suffix
        let required = format!(".{}", self.ctx.execute_api_suffix());
        if !zone_name.ends_with(&required) {
            return Err(BridgeError::DomainMismatch {
                zone_name,
                reason: format!("must end with {required}"),
            });
        }

        Ok(zone_name)
    }

    /// Create the zone, scoped to the VPC, and the apex alias record
    /// pointing at the load balancer
    pub async fn bind(
        &self,
        load_balancer: &LoadBalancerRef,
        vpc: &VpcRef,
    ) -> Result<DomainBinding> {
        let zone_name = self.zone_name(load_balancer)?;

        let zone_id = self
            .provisioner
            .create_private_zone(&zone_name, &vpc.id)
            .await?;
        self.provisioner
            .create_alias_record(&zone_id, &zone_name, &load_balancer.dns_name)
            .await?;

        info!(zone_name = %zone_name, vpc_id = %vpc.id, "Published private zone");

        Ok(DomainBinding {
            zone_id,
            zone_name,
            alias_target: load_balancer.dns_name.clone(),
        })
    }
}

fn validate_dns_label(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("label must be 1-63 characters".to_string());
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err("label must not start or end with a hyphen".to_string());
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(format!("label contains disallowed character {bad:?}"));
    }
    Ok(())
}
