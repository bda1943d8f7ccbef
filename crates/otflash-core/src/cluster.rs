//! Cluster-mode configuration (`clusters.conf`)
//!
//! Multi-host testbeds record per-host Thread operating modes in a shared
//! JSON file:
//!
//! ```json
//! {"clusters": [{"ip": "192.168.1.10", "thread_mode": "RCP"}]}
//! ```
//!
//! The file is optional. Hosts not listed, or testbeds without the file,
//! run in NCP mode.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Thread operating mode of a testbed host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ThreadMode {
    /// Network co-processor mode
    #[default]
    #[serde(rename = "NCP")]
    Ncp,
    /// Radio co-processor mode
    #[serde(rename = "RCP")]
    Rcp,
}

impl std::fmt::Display for ThreadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ncp => write!(f, "NCP"),
            Self::Rcp => write!(f, "RCP"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClusterFile {
    clusters: Vec<Cluster>,
}

/// One cluster entry from the file.
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    /// Host address the entry applies to
    pub ip: String,
    /// Thread mode that host runs in
    pub thread_mode: ThreadMode,
}

/// Parse cluster config text.
pub fn parse(text: &str) -> Result<Vec<Cluster>> {
    let file: ClusterFile = serde_json::from_str(text)?;
    Ok(file.clusters)
}

/// Thread mode for `host`, defaulting to NCP when the file is missing,
/// unreadable, or does not mention the host.
pub fn thread_mode_for(path: &Path, host: Option<&str>) -> ThreadMode {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            log::info!(
                "no cluster config at {}, running in NCP mode",
                path.display()
            );
            return ThreadMode::Ncp;
        }
    };

    let clusters = match parse(&text) {
        Ok(clusters) => clusters,
        Err(e) => {
            log::warn!("unreadable cluster config {}: {}", path.display(), e);
            return ThreadMode::Ncp;
        }
    };

    if let Some(host) = host {
        for cluster in &clusters {
            if cluster.ip == host {
                return cluster.thread_mode;
            }
        }
    }

    ThreadMode::Ncp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clusters() {
        let text = r#"{"clusters": [
            {"ip": "192.168.1.10", "thread_mode": "NCP"},
            {"ip": "192.168.1.11", "thread_mode": "RCP"}
        ]}"#;
        let clusters = parse(text).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].thread_mode, ThreadMode::Rcp);
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let text = r#"{"clusters": [{"ip": "10.0.0.1", "thread_mode": "FTD"}]}"#;
        assert!(parse(text).is_err());
    }

    #[test]
    fn test_missing_file_defaults_to_ncp() {
        let mode = thread_mode_for(Path::new("/nonexistent/clusters.conf"), Some("10.0.0.1"));
        assert_eq!(mode, ThreadMode::Ncp);
    }

    #[test]
    fn test_lookup_by_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusters.conf");
        std::fs::write(
            &path,
            r#"{"clusters": [{"ip": "192.168.1.11", "thread_mode": "RCP"}]}"#,
        )
        .unwrap();
        assert_eq!(
            thread_mode_for(&path, Some("192.168.1.11")),
            ThreadMode::Rcp
        );
        assert_eq!(thread_mode_for(&path, Some("192.168.1.12")), ThreadMode::Ncp);
        assert_eq!(thread_mode_for(&path, None), ThreadMode::Ncp);
    }
}
