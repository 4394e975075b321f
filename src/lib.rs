//! kind-lifecycle - reconciler for ephemeral kind clusters
//!
//! Drives create/read/update/delete transitions for local Kubernetes clusters
//! managed by the `kind` CLI and exports the credentials of each cluster.
//!
//! # Architecture
//!
//! Every transition is a short sequence of blocking `kind`/`kubectl`
//! invocations. Nothing is cached between transitions: the caller owns the
//! [`controller::ClusterRecord`] and hands identity back in on every call.
//!
//! # Modules
//!
//! - [`spec`] - Desired-state types (ClusterSpec, NodeSpec, PortMapping, MountSpec)
//! - [`bootstrap`] - Synthesizes the kind `Cluster` config from a ClusterSpec
//! - [`kubeconfig`] - Extracts endpoint and credentials from a kubeconfig
//! - [`runner`] - External command execution (mockable)
//! - [`backend`] - Typed kind/kubectl invocations
//! - [`probe`] - Cluster existence checks
//! - [`readiness`] - Bounded readiness polling
//! - [`controller`] - Lifecycle transitions
//! - [`config`] - Provider configuration passed into every transition
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod error;
pub mod kubeconfig;
pub mod probe;
pub mod readiness;
pub mod runner;
pub mod spec;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Node image used when the caller does not pick one
pub const DEFAULT_NODE_IMAGE: &str = "kindest/node:v1.28.0";

/// `kind` field of the synthesized bootstrap config
pub const DEFAULT_CONFIG_KIND: &str = "Cluster";

/// `apiVersion` field of the synthesized bootstrap config
pub const DEFAULT_CONFIG_API_VERSION: &str = "kind.x-k8s.io/v1alpha4";

/// Overall bound on readiness polling, in seconds
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 300;

/// Interval between readiness polls, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Environment variable carrying the container host override
pub const DOCKER_HOST_ENV: &str = "DOCKER_HOST";
