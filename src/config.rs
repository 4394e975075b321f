//! Provider configuration
//!
//! [`ProviderConfig`] is built once at the edge (CLI flags or
//! [`ProviderConfig::from_env`]) and passed explicitly into every controller
//! operation. Nothing in the crate reads the process environment on its own.
//!
//! The kubeconfig path resolution chain (highest priority first):
//! 1. First entry of `KUBECONFIG`
//! 2. `~/.kube/config`

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    Error, Result, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_READY_TIMEOUT_SECS, DOCKER_HOST_ENV,
};

const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Longest readiness bound accepted by [`WaitConfig::validate`]
pub const MAX_READY_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Bounds for readiness polling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitConfig {
    /// Time between polls
    pub interval: Duration,
    /// Overall bound
    pub timeout: Duration,
}

impl WaitConfig {
    /// Build validated polling bounds
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self> {
        let wait = Self { interval, timeout };
        wait.validate()?;
        Ok(wait)
    }

    /// Check the bounds can drive a poll loop
    ///
    /// The interval must be non-zero and the timeout at most
    /// [`MAX_READY_TIMEOUT`].
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::validation("readiness poll interval must be greater than zero"));
        }
        if self.timeout > MAX_READY_TIMEOUT {
            return Err(Error::validation(format!(
                "readiness timeout {:?} exceeds the maximum of {:?}",
                self.timeout, MAX_READY_TIMEOUT
            )));
        }
        Ok(())
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
        }
    }
}

/// Configuration shared by all lifecycle operations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Container host override, exported as `DOCKER_HOST` to kind
    pub docker_host: Option<String>,
    /// kind binary
    pub kind_binary: String,
    /// kubectl binary
    pub kubectl_binary: String,
    /// Kubeconfig file kind writes into, reported on the record
    pub kubeconfig_path: PathBuf,
    /// Readiness polling bounds
    pub wait: WaitConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            docker_host: None,
            kind_binary: "kind".to_string(),
            kubectl_binary: "kubectl".to_string(),
            kubeconfig_path: resolve_kubeconfig_path(None, dirs::home_dir()),
            wait: WaitConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Build a config from `DOCKER_HOST` and `KUBECONFIG`
    pub fn from_env() -> Self {
        Self {
            docker_host: std::env::var(DOCKER_HOST_ENV).ok(),
            kubeconfig_path: resolve_kubeconfig_path(
                std::env::var_os(KUBECONFIG_ENV),
                dirs::home_dir(),
            ),
            ..Default::default()
        }
        .normalized()
    }

    /// Set the container host override
    pub fn with_docker_host(mut self, host: impl Into<String>) -> Self {
        self.docker_host = Some(host.into());
        self.normalized()
    }

    /// Set the readiness polling bounds
    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// The host override, if one is set and non-empty
    pub fn docker_host(&self) -> Option<&str> {
        self.docker_host.as_deref().filter(|h| !h.is_empty())
    }

    fn normalized(mut self) -> Self {
        if self.docker_host.as_deref().is_some_and(str::is_empty) {
            self.docker_host = None;
        }
        self
    }
}

/// Pick the kubeconfig path kind will write to
///
/// kind uses the first entry of a `KUBECONFIG` path list.
pub fn resolve_kubeconfig_path(
    kubeconfig_env: Option<OsString>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(first) = kubeconfig_env
        .as_ref()
        .and_then(|v| std::env::split_paths(v).find(|p| !p.as_os_str().is_empty()))
    {
        return first;
    }
    home.unwrap_or_default().join(".kube").join("config")
}
