//! Probe backend registration and dispatch

use otflash_core::error::{Error, Result};
use otflash_core::ScriptRunner;

/// Information about a probe backend
pub struct ProbeInfo {
    /// Name used for matching on the command line
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// All available probe backends
pub fn available_probes() -> Vec<ProbeInfo> {
    vec![
        ProbeInfo {
            name: "jlink",
            description: "SEGGER J-Link via JLinkExe (default)",
        },
        ProbeInfo {
            name: "dummy",
            description: "Recording fake for dry runs, no hardware needed",
        },
    ]
}

/// Generate help text listing all probe backends
pub fn probe_help() -> String {
    let names: Vec<&str> = available_probes().iter().map(|p| p.name).collect();
    format!("Probe backend to use [available: {}]", names.join(", "))
}

/// Execute a function with the named probe backend
pub fn with_probe<F>(name: &str, f: F) -> Result<()>
where
    F: FnOnce(&mut dyn ScriptRunner) -> Result<()>,
{
    match name {
        "jlink" => {
            let mut runner = otflash_jlink::JLinkRunner::discover()?;
            f(&mut runner)
        }
        "dummy" => {
            let mut runner = otflash_dummy::DummyProbe::new();
            f(&mut runner)
        }
        other => {
            eprintln!("Unknown probe backend: {}\n", other);
            for probe in available_probes() {
                eprintln!("  {:8} - {}", probe.name, probe.description);
            }
            Err(Error::UnknownProbe(other.to_string()))
        }
    }
}
