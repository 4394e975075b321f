//! Lifecycle controller for kind clusters
//!
//! This module contains the create/read/update/delete transitions. Each
//! transition takes the caller's [`ProviderConfig`](crate::config::ProviderConfig)
//! explicitly and holds no state between calls.

mod cluster;

pub use cluster::{ClusterController, ClusterIdentity, ClusterRecord, ReadOutcome};
