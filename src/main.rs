//! kind-lifecycle - drive kind cluster transitions from the command line

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kind_lifecycle::bootstrap::synthesize;
use kind_lifecycle::config::{ProviderConfig, WaitConfig};
use kind_lifecycle::controller::{ClusterController, ClusterIdentity, ClusterRecord, ReadOutcome};
use kind_lifecycle::spec::ClusterSpec;
use kind_lifecycle::{DEFAULT_POLL_INTERVAL_SECS, DEFAULT_READY_TIMEOUT_SECS};

/// kind-lifecycle - reconcile ephemeral kind clusters
#[derive(Parser, Debug)]
#[command(name = "kind-lifecycle", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    provider: ProviderArgs,

    /// Print credentials in clear text instead of redacting them
    #[arg(long, global = true)]
    show_sensitive: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Provider-wide settings shared by every command
#[derive(Args, Debug)]
struct ProviderArgs {
    /// Container host override exported to kind
    #[arg(long, env = "DOCKER_HOST", global = true)]
    docker_host: Option<String>,

    /// kind binary
    #[arg(long, env = "KIND_BIN", default_value = "kind", global = true)]
    kind_bin: String,

    /// kubectl binary
    #[arg(long, env = "KUBECTL_BIN", default_value = "kubectl", global = true)]
    kubectl_bin: String,

    /// Seconds to wait for a new cluster to become ready
    #[arg(long, default_value_t = DEFAULT_READY_TIMEOUT_SECS, global = true)]
    ready_timeout_secs: u64,

    /// Seconds between readiness polls
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS, global = true)]
    poll_interval_secs: u64,
}

impl ProviderArgs {
    fn into_config(self) -> anyhow::Result<ProviderConfig> {
        let wait = WaitConfig::new(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.ready_timeout_secs),
        )?;
        let config = ProviderConfig {
            kind_binary: self.kind_bin,
            kubectl_binary: self.kubectl_bin,
            ..ProviderConfig::from_env()
        }
        .with_wait(wait);

        Ok(match self.docker_host {
            Some(host) => config.with_docker_host(host),
            None => config,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a cluster from a spec file
    Create(SpecArgs),

    /// Refresh the record of an existing cluster
    Read(ReadArgs),

    /// Re-read a cluster from a spec file and report force-new fields
    Update(UpdateArgs),

    /// Delete a cluster (succeeds if it is already gone)
    Delete {
        /// Cluster name
        name: String,
    },

    /// Adopt an existing cluster by name
    Import {
        /// Cluster name
        name: String,
    },

    /// Print the kind config a spec file would produce
    Render(SpecArgs),

    /// Print the JSON schema of the spec file
    Schema,
}

#[derive(Args, Debug)]
struct SpecArgs {
    /// Path to the cluster spec (YAML or JSON)
    #[arg(short = 'f', long = "file")]
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ReadArgs {
    /// Cluster name
    name: String,

    /// Node image the cluster was created with, if known
    #[arg(long)]
    node_image: Option<String>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    #[command(flatten)]
    spec: SpecArgs,

    /// Spec the cluster was last created from, for force-new detection
    #[arg(long)]
    previous: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let show_sensitive = cli.show_sensitive;
    let config = cli.provider.into_config()?;
    let controller = ClusterController::new();

    match cli.command {
        Commands::Create(args) => {
            let spec = load_spec(&args.file)?;
            let record = controller.create(&spec, &config)?;
            print_record(&record, show_sensitive)
        }
        Commands::Read(args) => {
            let identity = ClusterIdentity {
                node_image: args.node_image,
                ..ClusterIdentity::import(args.name)
            };
            print_outcome(controller.read(&identity, &config)?, show_sensitive)
        }
        Commands::Update(args) => {
            let spec = load_spec(&args.spec.file)?;
            if let Some(previous) = &args.previous {
                let previous = load_spec(previous)?;
                let fields = previous.replacement_fields(&spec);
                if !fields.is_empty() {
                    anyhow::bail!(
                        "cluster {} must be replaced, changed fields: {}",
                        previous.name,
                        fields.join(", ")
                    );
                }
            }
            print_outcome(controller.update(&spec, &config)?, show_sensitive)
        }
        Commands::Delete { name } => {
            controller.delete(&name, &config)?;
            Ok(())
        }
        Commands::Import { name } => {
            print_outcome(controller.import(&name, &config)?, show_sensitive)
        }
        Commands::Render(args) => {
            let spec = load_spec(&args.file)?;
            print!("{}", synthesize(&spec).to_yaml()?);
            Ok(())
        }
        Commands::Schema => {
            let schema = schemars::schema_for!(ClusterSpec);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn load_spec(path: &Path) -> anyhow::Result<ClusterSpec> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read spec file {:?}: {}", path, e))?;
    Ok(ClusterSpec::from_yaml(&content)?)
}

fn print_outcome(outcome: ReadOutcome, show_sensitive: bool) -> anyhow::Result<()> {
    match outcome {
        ReadOutcome::Present(record) => print_record(&record, show_sensitive),
        ReadOutcome::Gone => anyhow::bail!("cluster not found"),
    }
}

fn print_record(record: &ClusterRecord, show_sensitive: bool) -> anyhow::Result<()> {
    let json = if show_sensitive {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string_pretty(&record.redacted())?
    };
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(args: &[&str]) -> ProviderArgs {
        let mut argv = vec!["kind-lifecycle"];
        argv.extend_from_slice(args);
        argv.push("schema");
        Cli::try_parse_from(argv).unwrap().provider
    }

    #[test]
    fn test_cli_knobs_override_provider_defaults() {
        let config = provider(&[
            "--kind-bin",
            "/opt/kind",
            "--kubectl-bin",
            "/opt/kubectl",
            "--docker-host",
            "",
            "--poll-interval-secs",
            "2",
            "--ready-timeout-secs",
            "60",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.kind_binary, "/opt/kind");
        assert_eq!(config.kubectl_binary, "/opt/kubectl");
        assert_eq!(config.docker_host(), None);
        assert_eq!(config.wait.interval, Duration::from_secs(2));
        assert_eq!(config.wait.timeout, Duration::from_secs(60));
        assert_eq!(
            config.kubeconfig_path,
            ProviderConfig::from_env().kubeconfig_path
        );
    }

    #[test]
    fn test_cli_rejects_unusable_wait_bounds() {
        assert!(provider(&["--poll-interval-secs", "0"]).into_config().is_err());
        assert!(provider(&["--ready-timeout-secs", &u64::MAX.to_string()])
            .into_config()
            .is_err());
    }
}
