//! Credential extraction from kind kubeconfigs
//!
//! `kind get kubeconfig` prints a standard multi-cluster kubeconfig. Only
//! the first `clusters` entry and the first `users` entry are consulted.
//! Extraction is best-effort per field: a missing list or leaf yields an
//! empty string. The only hard failure is a document that is not YAML or
//! whose root is not a mapping.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{Error, Result};

/// Connection material for one cluster
///
/// All fields except `endpoint` are secrets. `Debug` redacts them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCredentials {
    /// API server URL
    pub endpoint: String,
    /// Base64 cluster CA certificate
    pub cluster_ca_certificate: String,
    /// Base64 client certificate
    pub client_certificate: String,
    /// Base64 client key
    pub client_key: String,
}

impl std::fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("endpoint", &self.endpoint)
            .field("cluster_ca_certificate", &redact(&self.cluster_ca_certificate))
            .field("client_certificate", &redact(&self.client_certificate))
            .field("client_key", &redact(&self.client_key))
            .finish()
    }
}

/// Placeholder shown instead of secret values
pub(crate) fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "<redacted>"
    }
}

/// Extract credentials from kubeconfig text
pub fn extract(kubeconfig: &str) -> Result<ClusterCredentials> {
    let doc: Value = serde_yaml::from_str(kubeconfig).map_err(|e| Error::parse(e.to_string()))?;

    match doc {
        Value::Null => return Ok(ClusterCredentials::default()),
        Value::Mapping(_) => {}
        _ => return Err(Error::parse("kubeconfig root is not a mapping")),
    }

    let cluster = first_entry(&doc, "clusters", "cluster");
    let user = first_entry(&doc, "users", "user");

    Ok(ClusterCredentials {
        endpoint: leaf(cluster, "server"),
        cluster_ca_certificate: leaf(cluster, "certificate-authority-data"),
        client_certificate: leaf(user, "client-certificate-data"),
        client_key: leaf(user, "client-key-data"),
    })
}

/// `doc[list][0][inner]`, if every step is present
fn first_entry<'a>(doc: &'a Value, list: &str, inner: &str) -> Option<&'a Value> {
    doc.get(list)?.as_sequence()?.first()?.get(inner)
}

fn leaf(entry: Option<&Value>, key: &str) -> String {
    entry
        .and_then(|e| e.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
