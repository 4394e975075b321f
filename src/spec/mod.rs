//! Desired-state types for kind clusters
//!
//! These are the strongly-typed records a caller hands to the
//! [`controller`](crate::controller). They are validated once when parsed
//! and never re-inspected as loose maps afterwards.

mod cluster;
mod types;

pub use cluster::{ClusterSpec, MountSpec, NodeSpec, PortMapping};
pub use types::{MountPropagation, NodeRole, PortProtocol};
