//! Tool configuration (`otflash.toml`)
//!
//! Everything the test-cycle orchestrator needs to know about the testbed
//! host: where the managed repositories live, how to build them, and where
//! the shared testbed directories are. Every key has a default matching the
//! canonical `/opt/openthread_test` layout, and a missing file simply means
//! "all defaults".

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default location of the config file.
pub const DEFAULT_CONFIG_PATH: &str = "/opt/openthread_test/config/otflash.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CiConfig {
    /// Firmware component (the OpenThread source tree)
    pub firmware: FirmwareConfig,
    /// Driver component (the wpantund package)
    pub driver: DriverConfig,
    /// Shared testbed directories and inputs
    pub paths: PathsConfig,
    /// Test-runner invocation
    pub tests: TestsConfig,
}

/// Firmware component settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirmwareConfig {
    /// Repository to pull
    pub repo: PathBuf,
    /// Build command, run through the shell with the repo as cwd
    pub build: String,
    /// Hex image the build produces, relative to the repo
    pub image: PathBuf,
    /// Settle delay between erase and flash, per board, in seconds
    pub erase_settle_secs: u64,
    /// Settle delay after flashing, per board, in seconds
    pub flash_settle_secs: u64,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("/opt/openthread"),
            build: "make -f examples/Makefile-nrf52840".to_string(),
            image: PathBuf::from("output/nrf52840/bin/ot-cli-ftd.hex"),
            erase_settle_secs: 2,
            flash_settle_secs: 5,
        }
    }
}

/// Driver component settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Repository to pull
    pub repo: PathBuf,
    /// Build command, run through the shell with the repo as cwd
    pub build: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("/opt/wpantund"),
            build: "make && sudo make install".to_string(),
        }
    }
}

/// Shared testbed directories and read-only inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory receiving the staged hex image
    pub image_dir: PathBuf,
    /// Directory receiving per-run results subdirectories
    pub results_dir: PathBuf,
    /// Hardware inventory file
    pub hwconfig: PathBuf,
    /// Cluster-mode file
    pub clusters: PathBuf,
    /// This host's address in the cluster file, if part of a cluster
    pub host: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("/opt/openthread_test/nrf52840_image"),
            results_dir: PathBuf::from("/opt/openthread_test/results"),
            hwconfig: PathBuf::from("/opt/openthread_test/config/hwconfig.ini"),
            clusters: PathBuf::from("/opt/openthread_test/config/clusters.conf"),
            host: None,
        }
    }
}

/// Test-runner invocation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsConfig {
    /// Runner command prefix, run through the shell
    pub runner: String,
    /// Directory holding the test files, used as the runner's cwd
    pub dir: PathBuf,
    /// Shell pattern of test files to hand to the runner
    pub pattern: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            runner: "python3 silk_run.py".to_string(),
            dir: PathBuf::from("/opt/openthread_test/silk/tests"),
            pattern: "ot_test_*.py".to_string(),
        }
    }
}

impl CiConfig {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist and parse. Without one,
    /// the default location is tried and a missing file yields the default
    /// configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    log::debug!("no config at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_testbed_layout() {
        let cfg = CiConfig::default();
        assert_eq!(cfg.firmware.repo, Path::new("/opt/openthread"));
        assert_eq!(
            cfg.paths.image_dir,
            Path::new("/opt/openthread_test/nrf52840_image")
        );
        assert_eq!(cfg.tests.pattern, "ot_test_*.py");
    }

    #[test]
    fn test_partial_file_keeps_defaults_elsewhere() {
        let cfg: CiConfig = toml::from_str(
            r#"
[firmware]
repo = "/src/openthread"

[tests]
runner = "python3 run.py"
"#,
        )
        .unwrap();
        assert_eq!(cfg.firmware.repo, Path::new("/src/openthread"));
        assert_eq!(cfg.firmware.build, "make -f examples/Makefile-nrf52840");
        assert_eq!(cfg.tests.runner, "python3 run.py");
        assert_eq!(cfg.driver.repo, Path::new("/opt/wpantund"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result: std::result::Result<CiConfig, _> = toml::from_str("[firmware]\nrepos = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(CiConfig::load(Some(Path::new("/nonexistent/otflash.toml"))).is_err());
    }
}
