//! Access policy document attached to the private service
//!
//! The document serializes to the exact JSON shape the platform's
//! policy engine consumes. Evaluation is also implemented locally so
//! the allow/deny semantics of a generated document can be exercised
//! in tests; at request time the platform, not this crate, evaluates
//! the document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition key carrying the endpoint a request entered through
pub const SOURCE_ENDPOINT_KEY: &str = "aws:SourceVpce";

/// Action name for invoking the private service
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Policy language version understood by the platform engine
pub const POLICY_VERSION: &str = "2012-10-17";

/// Statement effect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Condition block: operator -> condition key -> expected value
pub type ConditionMap = BTreeMap<String, BTreeMap<String, String>>;

/// One policy statement
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,

    /// `"*"` for any principal
    pub principal: String,

    pub action: Vec<String>,

    pub resource: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionMap>,
}

/// A synthetic request used to evaluate a document locally
#[derive(Clone, Debug)]
pub struct AccessRequest {
    pub action: String,
    pub resource: String,

    /// Endpoint the request arrived through, if it traversed one
    pub source_endpoint: Option<String>,
}

/// Ordered list of statements evaluated allow-unless-explicitly-denied
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessPolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl AccessPolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: statements,
        }
    }

    /// Evaluate a request against the document.
    ///
    /// An explicit deny overrides any allow; with no matching allow the
    /// result is an implicit deny.
    pub fn evaluate(&self, request: &AccessRequest) -> Effect {
        let mut allowed = false;

        for statement in &self.statement {
            if !statement.matches(request) {
                continue;
            }
            match statement.effect {
                Effect::Deny => return Effect::Deny,
                Effect::Allow => allowed = true,
            }
        }

        if allowed {
            Effect::Allow
        } else {
            Effect::Deny
        }
    }

    /// Endpoint id the document's deny condition pins traffic to.
    ///
    /// The orchestrator checks this against the endpoint the routing
    /// table actually serves; a mismatch is a silent isolation break
    /// the platform would never report.
    pub fn source_endpoint_constraint(&self) -> Option<&str> {
        self.statement
            .iter()
            .filter(|statement| statement.effect == Effect::Deny)
            .find_map(|statement| {
                statement
                    .condition
                    .as_ref()?
                    .get("StringNotEquals")?
                    .get(SOURCE_ENDPOINT_KEY)
                    .map(String::as_str)
            })
    }
}

impl Statement {
    fn matches(&self, request: &AccessRequest) -> bool {
        self.matches_action(&request.action)
            && self.matches_resource(&request.resource)
            && self.matches_condition(request)
    }

    fn matches_action(&self, action: &str) -> bool {
        self.action.iter().any(|a| a == "*" || a == action)
    }

    fn matches_resource(&self, resource: &str) -> bool {
        self.resource.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix('*') {
                resource.starts_with(prefix)
            } else {
                pattern == resource
            }
        })
    }

    fn matches_condition(&self, request: &AccessRequest) -> bool {
        let Some(condition) = &self.condition else {
            return true;
        };

        for (operator, pairs) in condition {
            for (key, expected) in pairs {
                let actual = match key.as_str() {
                    SOURCE_ENDPOINT_KEY => request.source_endpoint.as_deref(),
                    _ => None,
                };
                let holds = match operator.as_str() {
                    "StringEquals" => actual == Some(expected.as_str()),
                    // A missing key is "not equal", matching the
                    // platform engine's treatment of absent keys.
                    "StringNotEquals" => actual != Some(expected.as_str()),
                    _ => false,
                };
                if !holds {
                    return false;
                }
            }
        }
        true
    }
}
