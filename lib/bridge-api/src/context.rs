//! Deployment configuration passed explicitly into every component

use serde::{Deserialize, Serialize};

/// Deployment-wide configuration.
///
/// Everything a component needs about the surrounding deployment is
/// carried here; components never consult ambient stack state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeployContext {
    /// Naming prefix applied to resources created by this deployment
    pub prefix: String,

    /// Platform region the deployment targets
    pub region: String,

    /// Account that owns the deployed resources
    pub account_id: String,

    /// Root domain of the platform's managed-service certificates
    #[serde(default = "default_platform_domain")]
    pub platform_domain: String,
}

impl DeployContext {
    pub fn new(
        prefix: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            region: region.into(),
            account_id: account_id.into(),
            platform_domain: default_platform_domain(),
        }
    }

    /// Domain suffix covered by the destination service's TLS certificate.
    ///
    /// The destination terminates TLS under a certificate valid for
    /// `*.execute-api.<region>.<platform_domain>`; any private zone the
    /// bridge publishes must sit directly under this suffix.
    pub fn execute_api_suffix(&self) -> String {
        format!("execute-api.{}.{}", self.region, self.platform_domain)
    }

    /// Resource pattern covering every API stage in this account/region
    pub fn execute_api_resource(&self) -> String {
        format!(
            "arn:aws:execute-api:{}:{}:*",
            self.region, self.account_id
        )
    }
}

fn default_platform_domain() -> String {
    "amazonaws.com".to_string()
}
