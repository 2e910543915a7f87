//! Out-of-band control-plane query boundary
//!
//! The declarative provisioning interface does not surface every
//! attribute of a deployed resource; this library provides the escape
//! hatch the bridge uses to read those attributes at deploy time:
//! - ControlPlaneQuery: the query capability (action, parameters,
//!   output path, idempotency key -> extracted value)
//! - HttpControlPlane: reqwest-backed implementation with retries and
//!   exponential backoff
//! - IdempotentQueries: caching wrapper so repeated deployments reuse
//!   a physical lookup instead of repeating it
//! - MemoryControlPlane: canned-response implementation for tests and
//!   dry runs

pub mod error;
pub mod query;
pub mod retry;
pub mod http;
pub mod idempotency;
pub mod memory;

pub use error::{PlatformError, Result};
pub use query::{ControlPlaneQuery, QueryRequest};
pub use retry::RetryConfig;
pub use http::HttpControlPlane;
pub use idempotency::IdempotentQueries;
pub use memory::MemoryControlPlane;
