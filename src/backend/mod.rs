//! Typed kind and kubectl invocations
//!
//! [`KindBackend`] owns the exact command lines this crate issues and adds
//! the container host override to every `kind` call. It borrows the runner
//! and the per-operation [`ProviderConfig`]; it holds no state of its own.

use std::path::Path;

use crate::config::ProviderConfig;
use crate::runner::{CommandOutput, CommandRunner, Invocation};
use crate::{Result, DOCKER_HOST_ENV};

/// kubectl context kind creates for a cluster
pub fn context_name(cluster: &str) -> String {
    format!("kind-{}", cluster)
}

/// Command surface of the kind and kubectl CLIs
pub struct KindBackend<'a, R: CommandRunner + ?Sized> {
    runner: &'a R,
    config: &'a ProviderConfig,
}

impl<'a, R: CommandRunner + ?Sized> KindBackend<'a, R> {
    /// Bind a runner to a provider config
    pub fn new(runner: &'a R, config: &'a ProviderConfig) -> Self {
        Self { runner, config }
    }

    /// The config this backend was bound with
    pub fn config(&self) -> &ProviderConfig {
        self.config
    }

    fn kind(&self) -> Invocation {
        let inv = Invocation::new(&self.config.kind_binary);
        match self.config.docker_host() {
            Some(host) => inv.env(DOCKER_HOST_ENV, host),
            None => inv,
        }
    }

    fn kubectl(&self) -> Invocation {
        Invocation::new(&self.config.kubectl_binary)
    }

    fn run(&self, invocation: Invocation) -> Result<(Invocation, CommandOutput)> {
        let output = self.runner.run(&invocation)?;
        Ok((invocation, output))
    }

    /// `kind get clusters`
    pub fn get_clusters(&self) -> Result<(Invocation, CommandOutput)> {
        self.run(self.kind().args(["get", "clusters"]))
    }

    /// `kind create cluster --name N --config FILE --image IMG`
    pub fn create_cluster(
        &self,
        name: &str,
        config_file: &Path,
        image: &str,
    ) -> Result<(Invocation, CommandOutput)> {
        self.run(
            self.kind()
                .args(["create", "cluster", "--name", name, "--config"])
                .arg(config_file.to_string_lossy())
                .args(["--image", image]),
        )
    }

    /// `kind delete cluster --name N`
    pub fn delete_cluster(&self, name: &str) -> Result<(Invocation, CommandOutput)> {
        self.run(self.kind().args(["delete", "cluster", "--name", name]))
    }

    /// `kind get kubeconfig --name N`
    pub fn get_kubeconfig(&self, name: &str) -> Result<(Invocation, CommandOutput)> {
        self.run(self.kind().args(["get", "kubeconfig", "--name", name]))
    }

    /// `kubectl cluster-info --context kind-N`
    pub fn cluster_info(&self, name: &str) -> Result<(Invocation, CommandOutput)> {
        self.run(
            self.kubectl()
                .args(["cluster-info", "--context"])
                .arg(context_name(name)),
        )
    }

    /// `kubectl get nodes --context kind-N --no-headers`
    pub fn get_nodes(&self, name: &str) -> Result<(Invocation, CommandOutput)> {
        self.run(
            self.kubectl()
                .args(["get", "nodes", "--context"])
                .arg(context_name(name))
                .arg("--no-headers"),
        )
    }
}
