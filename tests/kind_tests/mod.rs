//! Integration tests for kind-lifecycle
//!
//! These tests drive real kind clusters and tell the story of how a caller
//! creates, inspects and tears down ephemeral clusters.
//!
//! # Test Organization
//!
//! - `cluster_lifecycle`: Stories about the Create/Read/Delete transitions,
//!   readiness waiting and drift detection on a live cluster
//!
//! # Running These Tests
//!
//! Creating a kind cluster takes about a minute, so run them serially:
//!
//! ```bash
//! cargo test --test kind -- --ignored --test-threads=1 --nocapture
//! ```

mod cluster_lifecycle;
