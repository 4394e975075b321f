//! Supporting enums for the cluster desired state

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Role a kind node plays in the cluster
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    /// Runs the Kubernetes control plane
    ControlPlane,
    /// Runs workloads only
    Worker,
}

impl std::str::FromStr for NodeRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "control-plane" => Ok(Self::ControlPlane),
            "worker" => Ok(Self::Worker),
            _ => Err(crate::Error::validation(format!(
                "invalid node role: {s}, expected one of: control-plane, worker"
            ))),
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlPlane => write!(f, "control-plane"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// Transport protocol of a port mapping
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortProtocol {
    /// TCP (default)
    #[default]
    Tcp,
    /// UDP
    Udp,
    /// SCTP
    Sctp,
}

impl std::str::FromStr for PortProtocol {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TCP" => Ok(Self::Tcp),
            "UDP" => Ok(Self::Udp),
            "SCTP" => Ok(Self::Sctp),
            _ => Err(crate::Error::validation(format!(
                "invalid protocol: {s}, expected one of: TCP, UDP, SCTP"
            ))),
        }
    }
}

impl std::fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
            Self::Sctp => write!(f, "SCTP"),
        }
    }
}

/// Mount propagation mode, using kind's spelling
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum MountPropagation {
    /// No propagation (default)
    #[default]
    None,
    /// Host mounts propagate into the container
    HostToContainer,
    /// Mounts propagate both ways
    Bidirectional,
}

impl std::str::FromStr for MountPropagation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "HostToContainer" => Ok(Self::HostToContainer),
            "Bidirectional" => Ok(Self::Bidirectional),
            _ => Err(crate::Error::validation(format!(
                "invalid mount propagation: {s}, expected one of: None, HostToContainer, Bidirectional"
            ))),
        }
    }
}

impl std::fmt::Display for MountPropagation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::HostToContainer => write!(f, "HostToContainer"),
            Self::Bidirectional => write!(f, "Bidirectional"),
        }
    }
}
