//! Bootstrap config synthesis
//!
//! Turns a [`ClusterSpec`] into the kind `Cluster` config document passed to
//! `kind create cluster --config`. Synthesis is pure and never fails.
//!
//! Empty collections are left out of the document rather than written as
//! `[]`. For `nodes` this is load-bearing: kind reads a missing `nodes` key
//! as "one control-plane node", while an empty list is a different request.
//! Inside a node the same rule applies so the output has one shape.

use serde::{Deserialize, Serialize};

use crate::spec::{
    ClusterSpec, MountPropagation, MountSpec, NodeRole, NodeSpec, PortMapping, PortProtocol,
};
use crate::{Error, Result, DEFAULT_CONFIG_API_VERSION, DEFAULT_CONFIG_KIND};

/// kind cluster config document
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapSpec {
    /// Document kind (normally `Cluster`)
    pub kind: String,
    /// Document API version
    pub api_version: String,
    /// Node records; `None` lets kind choose its single-node default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<BootstrapNode>>,
}

/// One node record in kind's naming
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapNode {
    /// Node role
    pub role: NodeRole,
    /// Published ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_port_mappings: Vec<BootstrapPortMapping>,
    /// kubeadm patches, verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kubeadm_config_patches: Vec<String>,
    /// Host mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_mounts: Vec<BootstrapMount>,
}

/// Port mapping in kind's naming
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapPortMapping {
    /// Port inside the node container
    pub container_port: u16,
    /// Port on the host
    pub host_port: u16,
    /// Transport protocol
    pub protocol: PortProtocol,
}

/// Mount in kind's naming; unset optional fields are omitted
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapMount {
    /// Path on the host
    pub host_path: String,
    /// Path inside the node container
    pub container_path: String,
    /// Read-only flag, if the caller set it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// SELinux relabel flag, if the caller set it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selinux_relabel: Option<bool>,
    /// Propagation mode, if the caller set it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation: Option<MountPropagation>,
}

impl BootstrapSpec {
    /// Serialize the document to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::serialization(e.to_string()))
    }
}

/// Build the kind config document for a cluster spec
pub fn synthesize(spec: &ClusterSpec) -> BootstrapSpec {
    let nodes = if spec.nodes.is_empty() {
        None
    } else {
        Some(spec.nodes.iter().map(synthesize_node).collect())
    };

    BootstrapSpec {
        kind: spec
            .kind
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_KIND.to_string()),
        api_version: spec
            .api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_API_VERSION.to_string()),
        nodes,
    }
}

fn synthesize_node(node: &NodeSpec) -> BootstrapNode {
    BootstrapNode {
        role: node.role,
        extra_port_mappings: node.extra_port_mappings.iter().map(synthesize_port).collect(),
        kubeadm_config_patches: node.kubeadm_config_patches.clone(),
        extra_mounts: node.extra_mounts.iter().map(synthesize_mount).collect(),
    }
}

fn synthesize_port(mapping: &PortMapping) -> BootstrapPortMapping {
    BootstrapPortMapping {
        container_port: mapping.container_port,
        host_port: mapping.host_port,
        protocol: mapping.protocol,
    }
}

fn synthesize_mount(mount: &MountSpec) -> BootstrapMount {
    BootstrapMount {
        host_path: mount.host_path.clone(),
        container_path: mount.container_path.clone(),
        read_only: mount.read_only,
        selinux_relabel: mount.selinux_relabel,
        propagation: mount.propagation,
    }
}
