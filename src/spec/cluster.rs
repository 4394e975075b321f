//! ClusterSpec - desired state of a kind cluster

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{MountPropagation, NodeRole, PortProtocol};
use crate::{Error, Result, DEFAULT_NODE_IMAGE};

fn default_node_image() -> String {
    DEFAULT_NODE_IMAGE.to_string()
}

fn default_true() -> bool {
    true
}

/// Desired state of a kind cluster
///
/// `name` is the identity of the cluster. kind has no in-place
/// reconfiguration, so every field except `wait_for_ready` is force-new:
/// see [`ClusterSpec::replacement_fields`].
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Cluster name, passed to `kind --name`
    pub name: String,

    /// Node image passed to `kind create cluster --image`
    #[serde(default = "default_node_image")]
    pub node_image: String,

    /// Block Create until the cluster reports a Ready node
    #[serde(default = "default_true")]
    pub wait_for_ready: bool,

    /// Override for the config document `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Override for the config document `apiVersion`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Node topology in order; empty means kind's single-node default
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeSpec>,
}

impl ClusterSpec {
    /// Create a spec with defaults for everything but the name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_image: default_node_image(),
            wait_for_ready: true,
            kind: None,
            api_version: None,
            nodes: Vec::new(),
        }
    }

    /// Set the node image
    pub fn with_node_image(mut self, image: impl Into<String>) -> Self {
        self.node_image = image.into();
        self
    }

    /// Set whether Create waits for readiness
    pub fn with_wait_for_ready(mut self, wait: bool) -> Self {
        self.wait_for_ready = wait;
        self
    }

    /// Append a node to the topology
    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    /// Parse a spec from YAML (JSON is accepted too)
    pub fn from_yaml(content: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::serialization(format!("invalid cluster spec: {}", e)))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate the spec
    ///
    /// Names follow kind's own rule: lowercase alphanumerics, `-` and `.`.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::validation("cluster name must not be empty"));
        }
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        {
            return Err(Error::validation(format!(
                "cluster name '{}' must consist of lowercase alphanumerics, '-' or '.'",
                self.name
            )));
        }
        if self.node_image.trim().is_empty() {
            return Err(Error::validation("node image must not be empty"));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            for mount in &node.extra_mounts {
                if mount.host_path.is_empty() || mount.container_path.is_empty() {
                    return Err(Error::validation(format!(
                        "node {} has a mount with an empty hostPath or containerPath",
                        i
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fields that differ from `other` and force a destroy+recreate
    ///
    /// `wait_for_ready` only affects Create and never forces replacement.
    pub fn replacement_fields(&self, other: &ClusterSpec) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name != other.name {
            fields.push("name");
        }
        if self.node_image != other.node_image {
            fields.push("nodeImage");
        }
        if self.kind != other.kind {
            fields.push("kind");
        }
        if self.api_version != other.api_version {
            fields.push("apiVersion");
        }
        if self.nodes != other.nodes {
            fields.push("nodes");
        }
        fields
    }
}

/// One node of the cluster topology
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Control plane or worker
    pub role: NodeRole,

    /// Container ports exposed on the host
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_port_mappings: Vec<PortMapping>,

    /// kubeadm config patches, applied verbatim in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub kubeadm_config_patches: Vec<String>,

    /// Host paths mounted into the node container
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_mounts: Vec<MountSpec>,
}

impl NodeSpec {
    /// Create a node with the given role and nothing else
    pub fn new(role: NodeRole) -> Self {
        Self {
            role,
            extra_port_mappings: Vec::new(),
            kubeadm_config_patches: Vec::new(),
            extra_mounts: Vec::new(),
        }
    }

    /// Create a control-plane node
    pub fn control_plane() -> Self {
        Self::new(NodeRole::ControlPlane)
    }

    /// Create a worker node
    pub fn worker() -> Self {
        Self::new(NodeRole::Worker)
    }

    /// Add a port mapping
    pub fn with_port_mapping(mut self, mapping: PortMapping) -> Self {
        self.extra_port_mappings.push(mapping);
        self
    }

    /// Add a kubeadm config patch
    pub fn with_config_patch(mut self, patch: impl Into<String>) -> Self {
        self.kubeadm_config_patches.push(patch.into());
        self
    }

    /// Add an extra mount
    pub fn with_mount(mut self, mount: MountSpec) -> Self {
        self.extra_mounts.push(mount);
        self
    }
}

/// Container port published on the host
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Port inside the node container
    pub container_port: u16,
    /// Port on the host
    pub host_port: u16,
    /// Transport protocol
    #[serde(default)]
    pub protocol: PortProtocol,
}

impl PortMapping {
    /// Create a TCP port mapping
    pub fn new(container_port: u16, host_port: u16) -> Self {
        Self {
            container_port,
            host_port,
            protocol: PortProtocol::Tcp,
        }
    }

    /// Set the protocol
    pub fn with_protocol(mut self, protocol: PortProtocol) -> Self {
        self.protocol = protocol;
        self
    }
}

/// Host path mounted into a node container
///
/// The optional fields stay `None` unless the caller set them, so the
/// synthesized config only carries what was asked for. The accessors apply
/// kind's defaults.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MountSpec {
    /// Path on the host
    pub host_path: String,
    /// Path inside the node container
    pub container_path: String,
    /// Mount read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// Relabel for SELinux
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selinux_relabel: Option<bool>,
    /// Mount propagation mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation: Option<MountPropagation>,
}

impl MountSpec {
    /// Create a mount with no optional fields set
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            read_only: None,
            selinux_relabel: None,
            propagation: None,
        }
    }

    /// Set read-only
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    /// Set SELinux relabeling
    pub fn with_selinux_relabel(mut self, relabel: bool) -> Self {
        self.selinux_relabel = Some(relabel);
        self
    }

    /// Set the propagation mode
    pub fn with_propagation(mut self, propagation: MountPropagation) -> Self {
        self.propagation = Some(propagation);
        self
    }

    /// Whether the mount is read-only (default false)
    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(false)
    }

    /// Whether SELinux relabeling is on (default false)
    pub fn is_selinux_relabel(&self) -> bool {
        self.selinux_relabel.unwrap_or(false)
    }

    /// Effective propagation mode (default None)
    pub fn effective_propagation(&self) -> MountPropagation {
        self.propagation.unwrap_or_default()
    }
}
