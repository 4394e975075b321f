//! Cluster lifecycle controller
//!
//! Implements the four transitions against kind:
//!
//! - **Create** refuses existing names whatever the spec says, then
//!   validates the spec and wait bounds, writes the synthesized config to a
//!   scoped temp file, runs `kind create cluster`, optionally waits for
//!   readiness, and reads the record back
//! - **Read** treats a missing cluster as drift ([`ReadOutcome::Gone`]) and
//!   otherwise re-extracts credentials from a fresh kubeconfig
//! - **Update** is a Read; kind cannot reconfigure a running cluster
//! - **Delete** treats "not found" as success
//!
//! A Create that fails after kind reports success (for example a readiness
//! timeout) leaves the cluster running and returns an error. There is no
//! rollback; the next Read or Create will see it.

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::backend::KindBackend;
use crate::bootstrap::{synthesize, BootstrapSpec};
use crate::config::ProviderConfig;
use crate::kubeconfig::{self, redact, ClusterCredentials};
use crate::probe::cluster_exists;
use crate::readiness::{Clock, ReadinessWaiter, SystemClock};
use crate::runner::{CommandRunner, RealCommandRunner};
use crate::spec::ClusterSpec;
use crate::{Error, Result, DEFAULT_NODE_IMAGE};

/// Reconciled state of a cluster, owned by the caller
///
/// Credential fields are secrets; `Debug` redacts them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRecord {
    /// Cluster name (identity)
    pub name: String,
    /// Node image the cluster was created with
    pub node_image: String,
    /// Whether Create waited for readiness
    pub wait_for_ready: bool,
    /// Kubeconfig file kind merged the cluster's context into
    pub kubeconfig_path: PathBuf,
    /// Endpoint and credentials from the current kubeconfig
    #[serde(flatten)]
    pub credentials: ClusterCredentials,
}

impl ClusterRecord {
    /// Identity to hand back into the next Read
    pub fn identity(&self) -> ClusterIdentity {
        ClusterIdentity {
            name: self.name.clone(),
            node_image: Some(self.node_image.clone()),
            wait_for_ready: self.wait_for_ready,
        }
    }

    /// Copy of the record with secret fields masked
    pub fn redacted(&self) -> Self {
        let mut record = self.clone();
        let creds = &mut record.credentials;
        creds.cluster_ca_certificate = redact(&creds.cluster_ca_certificate).to_string();
        creds.client_certificate = redact(&creds.client_certificate).to_string();
        creds.client_key = redact(&creds.client_key).to_string();
        record
    }
}

/// What Read needs from caller-held state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterIdentity {
    /// Cluster name
    pub name: String,
    /// Node image, if known
    pub node_image: Option<String>,
    /// Whether Create waited for readiness
    pub wait_for_ready: bool,
}

impl ClusterIdentity {
    /// Identity for a cluster adopted by name only
    ///
    /// The creation-time node image cannot be recovered from kind, so Read will
    /// report the default.
    pub fn import(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_image: None,
            wait_for_ready: true,
        }
    }
}

impl From<&ClusterSpec> for ClusterIdentity {
    fn from(spec: &ClusterSpec) -> Self {
        Self {
            name: spec.name.clone(),
            node_image: Some(spec.node_image.clone()),
            wait_for_ready: spec.wait_for_ready,
        }
    }
}

/// Result of a Read
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The cluster exists; here is its refreshed record
    Present(ClusterRecord),
    /// kind no longer reports the cluster; the caller should drop its record
    Gone,
}

impl ReadOutcome {
    /// The record, if the cluster is present
    pub fn into_record(self) -> Option<ClusterRecord> {
        match self {
            Self::Present(record) => Some(record),
            Self::Gone => None,
        }
    }

    /// Whether the cluster was found missing
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }
}

/// Drives lifecycle transitions for kind clusters
///
/// Holds no per-cluster state. Callers must not run two transitions for the
/// same name at once.
pub struct ClusterController<R: CommandRunner = RealCommandRunner, C: Clock = SystemClock> {
    runner: R,
    clock: C,
}

impl ClusterController<RealCommandRunner, SystemClock> {
    /// Create a controller that runs real commands
    pub fn new() -> Self {
        Self {
            runner: RealCommandRunner,
            clock: SystemClock,
        }
    }
}

impl Default for ClusterController<RealCommandRunner, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner, C: Clock> ClusterController<R, C> {
    /// Create a controller with a custom runner and clock
    pub fn with_runner(runner: R, clock: C) -> Self {
        Self { runner, clock }
    }

    /// Create a cluster and return its record
    pub fn create(&self, spec: &ClusterSpec, config: &ProviderConfig) -> Result<ClusterRecord> {
        let backend = KindBackend::new(&self.runner, config);

        info!(cluster = %spec.name, image = %spec.node_image, "Creating kind cluster");

        if cluster_exists(&backend, &spec.name) {
            return Err(Error::conflict(&spec.name));
        }

        spec.validate()?;
        if spec.wait_for_ready {
            config.wait.validate()?;
        }
        log_mounts(spec);

        let config_file = write_config_file(&synthesize(spec))?;
        let (inv, output) =
            backend.create_cluster(&spec.name, config_file.path(), &spec.node_image)?;
        drop(config_file);

        if !output.success {
            return Err(Error::backend(inv.command_line(), output.combined()));
        }

        info!(cluster = %spec.name, "Kind cluster created");

        if spec.wait_for_ready {
            ReadinessWaiter::new(&backend, &self.clock).wait_ready(&spec.name)?;
        }

        match self.read(&ClusterIdentity::from(spec), config)? {
            ReadOutcome::Present(record) => Ok(record),
            ReadOutcome::Gone => Err(Error::not_found(&spec.name)),
        }
    }

    /// Refresh a cluster's record from kind
    pub fn read(&self, identity: &ClusterIdentity, config: &ProviderConfig) -> Result<ReadOutcome> {
        let backend = KindBackend::new(&self.runner, config);
        let name = &identity.name;

        info!(cluster = %name, "Reading kind cluster");

        if !cluster_exists(&backend, name) {
            warn!(cluster = %name, "Kind cluster not found, removing from state");
            return Ok(ReadOutcome::Gone);
        }

        let (inv, output) = backend.get_kubeconfig(name)?;
        if !output.success {
            return Err(Error::backend(inv.command_line(), output.combined()));
        }
        let credentials = kubeconfig::extract(&output.stdout)?;

        let node_image = identity
            .node_image
            .clone()
            .filter(|image| !image.is_empty())
            .unwrap_or_else(|| DEFAULT_NODE_IMAGE.to_string());

        Ok(ReadOutcome::Present(ClusterRecord {
            name: name.clone(),
            node_image,
            wait_for_ready: identity.wait_for_ready,
            kubeconfig_path: config.kubeconfig_path.clone(),
            credentials,
        }))
    }

    /// Adopt an existing cluster by name
    pub fn import(&self, name: &str, config: &ProviderConfig) -> Result<ReadOutcome> {
        self.read(&ClusterIdentity::import(name), config)
    }

    /// Update a cluster
    ///
    /// kind has no in-place reconfiguration, so this only refreshes the
    /// record. Field changes that need a new cluster are found with
    /// [`ClusterSpec::replacement_fields`] and handled as delete + create.
    pub fn update(&self, spec: &ClusterSpec, config: &ProviderConfig) -> Result<ReadOutcome> {
        spec.validate()?;
        self.read(&ClusterIdentity::from(spec), config)
    }

    /// Delete a cluster; deleting a missing cluster succeeds
    pub fn delete(&self, name: &str, config: &ProviderConfig) -> Result<()> {
        let backend = KindBackend::new(&self.runner, config);

        info!(cluster = %name, "Deleting kind cluster");

        let (inv, output) = backend.delete_cluster(name)?;
        if output.success {
            info!(cluster = %name, "Kind cluster deleted");
            return Ok(());
        }

        let combined = output.combined();
        if combined.contains("not found") {
            warn!(cluster = %name, "Kind cluster not found, considering it deleted");
            return Ok(());
        }

        Err(Error::backend(inv.command_line(), combined))
    }
}

fn log_mounts(spec: &ClusterSpec) {
    for (index, node) in spec.nodes.iter().enumerate() {
        for mount in &node.extra_mounts {
            debug!(
                cluster = %spec.name,
                node = index,
                host_path = %mount.host_path,
                container_path = %mount.container_path,
                read_only = mount.is_read_only(),
                selinux_relabel = mount.is_selinux_relabel(),
                propagation = %mount.effective_propagation(),
                "Mounting host path into node"
            );
        }
    }
}

/// Write the bootstrap config to a temp file removed on drop
fn write_config_file(bootstrap: &BootstrapSpec) -> Result<NamedTempFile> {
    let yaml = bootstrap.to_yaml()?;
    let mut file = tempfile::Builder::new()
        .prefix("kind-config-")
        .suffix(".yaml")
        .tempfile()?;
    file.write_all(yaml.as_bytes())?;
    file.flush()?;
    Ok(file)
}
