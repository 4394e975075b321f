//! Integration tests for cluster lifecycle
//!
//! These tests tell the story of a kind cluster from creation to deletion,
//! verifying the controller against the real kind and kubectl binaries.

use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use kind_lifecycle::config::ProviderConfig;
use kind_lifecycle::controller::{ClusterController, ClusterIdentity};
use kind_lifecycle::spec::{ClusterSpec, NodeSpec, PortMapping};
use kind_lifecycle::Error;

// =============================================================================
// Test Fixtures
// =============================================================================

/// A cluster name unlikely to collide with anything on the host
fn unique_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!("{prefix}-{:x}", nanos)
}

/// Deletes the named cluster when dropped, even if the test panics
struct ClusterGuard {
    name: String,
}

impl Drop for ClusterGuard {
    fn drop(&mut self) {
        let config = ProviderConfig::from_env();
        let _ = ClusterController::new().delete(&self.name, &config);
    }
}

fn kubectl_nodes(context: &str) -> String {
    let output = Command::new("kubectl")
        .args(["get", "nodes", "--context", context, "--no-headers"])
        .output()
        .expect("kubectl should run");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// Lifecycle Stories
// =============================================================================

/// Story: Create a default cluster, read it, delete it
///
/// The record carries a reachable endpoint and non-empty credentials, and a
/// second delete after the first is still a success.
#[test]
#[ignore = "requires kind"]
fn story_default_cluster_round_trip() {
    let controller = ClusterController::new();
    let config = ProviderConfig::from_env();
    let name = unique_name("kl-default");
    let _guard = ClusterGuard { name: name.clone() };

    let record = controller
        .create(&ClusterSpec::new(&name), &config)
        .expect("create should succeed");

    assert_eq!(record.name, name);
    assert!(record.credentials.endpoint.starts_with("https://"));
    assert!(!record.credentials.cluster_ca_certificate.is_empty());
    assert!(!record.credentials.client_certificate.is_empty());
    assert!(!record.credentials.client_key.is_empty());

    let outcome = controller.read(&record.identity(), &config).unwrap();
    assert_eq!(outcome.into_record().as_ref(), Some(&record));

    controller.delete(&name, &config).unwrap();
    controller.delete(&name, &config).unwrap();

    let outcome = controller.read(&record.identity(), &config).unwrap();
    assert!(outcome.is_gone());
}

/// Story: A control plane with two workers comes up Ready
#[test]
#[ignore = "requires kind"]
fn story_multi_node_cluster_is_ready() {
    let controller = ClusterController::new();
    let config = ProviderConfig::from_env();
    let name = unique_name("kl-multi");
    let _guard = ClusterGuard { name: name.clone() };

    let spec = ClusterSpec::new(&name)
        .with_node(NodeSpec::control_plane().with_port_mapping(PortMapping::new(30080, 18080)))
        .with_node(NodeSpec::worker())
        .with_node(NodeSpec::worker());

    controller.create(&spec, &config).expect("create should succeed");

    let nodes = kubectl_nodes(&format!("kind-{name}"));
    assert_eq!(nodes.lines().count(), 3);
}

/// Story: Creating over an existing cluster is refused
#[test]
#[ignore = "requires kind"]
fn story_create_existing_cluster_conflicts() {
    let controller = ClusterController::new();
    let config = ProviderConfig::from_env();
    let name = unique_name("kl-conflict");
    let _guard = ClusterGuard { name: name.clone() };

    let spec = ClusterSpec::new(&name).with_wait_for_ready(false);
    controller.create(&spec, &config).unwrap();

    match controller.create(&spec, &config) {
        Err(Error::Conflict { name: conflicted }) => assert_eq!(conflicted, name),
        other => panic!("Expected Conflict, got {:?}", other),
    }
}

/// Story: An imported cluster is read back with the default image
#[test]
#[ignore = "requires kind"]
fn story_import_existing_cluster() {
    let controller = ClusterController::new();
    let config = ProviderConfig::from_env();
    let name = unique_name("kl-import");
    let _guard = ClusterGuard { name: name.clone() };

    controller
        .create(&ClusterSpec::new(&name).with_wait_for_ready(false), &config)
        .unwrap();

    let record = controller
        .import(&name, &config)
        .unwrap()
        .into_record()
        .expect("imported cluster should be present");
    assert_eq!(record.node_image, kind_lifecycle::DEFAULT_NODE_IMAGE);
}

/// Story: Reading a cluster that never existed reports it gone
#[test]
#[ignore = "requires kind"]
fn story_read_missing_cluster() {
    let controller = ClusterController::new();
    let config = ProviderConfig::from_env();

    let outcome = controller
        .read(&ClusterIdentity::import(unique_name("kl-missing")), &config)
        .unwrap();
    assert!(outcome.is_gone());
}
