//! Resource-policy construction

use bridge_api::policy::{
    AccessPolicyDocument, Effect, Statement, INVOKE_ACTION, SOURCE_ENDPOINT_KEY,
};
use bridge_api::DeployContext;
use std::collections::BTreeMap;

/// Build the invocation policy pinning traffic to one endpoint.
///
/// Two statements: allow invocation from any principal, then deny any
/// request whose source endpoint is not the given one. The platform
/// engine lets the deny override the allow, so the net effect is that
/// only traffic which traversed that endpoint is permitted. Pure
/// function of its inputs.
pub fn endpoint_resource_policy(ctx: &DeployContext, endpoint_id: &str) -> AccessPolicyDocument {
    let resource = ctx.execute_api_resource();

    AccessPolicyDocument::new(vec![
        Statement {
            effect: Effect::Allow,
            principal: "*".to_string(),
            action: vec![INVOKE_ACTION.to_string()],
            resource: vec![resource.clone()],
            condition: None,
        },
        Statement {
            effect: Effect::Deny,
            principal: "*".to_string(),
            action: vec![INVOKE_ACTION.to_string()],
            resource: vec![resource],
            condition: Some(BTreeMap::from([(
                "StringNotEquals".to_string(),
                BTreeMap::from([(
                    SOURCE_ENDPOINT_KEY.to_string(),
                    endpoint_id.to_string(),
                )]),
            )])),
        },
    ])
}
