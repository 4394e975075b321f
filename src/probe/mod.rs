//! Cluster existence checks
//!
//! Listing failures are reported as "no clusters". A transient `kind get
//! clusters` failure therefore reads as absence, which sends Read down the
//! drift path and lets Create proceed.

use tracing::warn;

use crate::backend::KindBackend;
use crate::runner::CommandRunner;

/// Names of all clusters kind knows about
///
/// Returns an empty list if listing fails for any reason.
pub fn list_clusters<R: CommandRunner + ?Sized>(backend: &KindBackend<'_, R>) -> Vec<String> {
    match backend.get_clusters() {
        Ok((_, output)) if output.success => parse_cluster_list(&output.stdout),
        Ok((inv, output)) => {
            warn!(
                command = %inv,
                output = %output.combined().trim(),
                "Listing clusters failed, treating as empty"
            );
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Listing clusters failed, treating as empty");
            Vec::new()
        }
    }
}

/// Whether a cluster with exactly this name exists
pub fn cluster_exists<R: CommandRunner + ?Sized>(
    backend: &KindBackend<'_, R>,
    name: &str,
) -> bool {
    list_clusters(backend).iter().any(|c| c == name)
}

/// One cluster name per non-empty line
fn parse_cluster_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
