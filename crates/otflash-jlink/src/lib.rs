//! otflash-jlink - SEGGER J-Link probe backend
//!
//! Scripted actions are executed by materializing the command sequence into
//! a temporary script file and handing it to `JLinkExe`. The temp file is
//! removed after every invocation, success or failure; the probe's own exit
//! status is captured and logged but never turned into an error.
//!
//! The interactive probe modes (RTT, GDB server) live in [`rtt`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod rtt;

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use otflash_core::error::{Error, Result};
use otflash_core::runner::{ScriptRunner, Transcript};
use otflash_core::{script, Action};

/// Target device name passed to every J-Link tool.
pub const DEVICE: &str = "nRF52840_xxAA";
/// Target interface passed to every J-Link tool.
pub const INTERFACE: &str = "swd";
/// SWD speed in kHz passed to every J-Link tool.
pub const SPEED_KHZ: u32 = 4000;

/// J-Link Commander binary name.
pub const JLINK_EXE: &str = "JLinkExe";

/// Scripted probe invoker backed by `JLinkExe`.
pub struct JLinkRunner {
    exe: PathBuf,
    script_dir: Option<PathBuf>,
}

impl JLinkRunner {
    /// Locate `JLinkExe` on PATH.
    pub fn discover() -> Result<Self> {
        let exe = which::which(JLINK_EXE).map_err(|_| Error::ToolNotFound {
            name: JLINK_EXE.to_string(),
        })?;
        log::debug!("using {}", exe.display());
        Ok(Self::with_exe(exe))
    }

    /// Use a specific Commander executable.
    pub fn with_exe(exe: PathBuf) -> Self {
        Self {
            exe,
            script_dir: None,
        }
    }

    /// Place temporary script files in `dir` instead of the system temp dir.
    pub fn with_script_dir(mut self, dir: PathBuf) -> Self {
        self.script_dir = Some(dir);
        self
    }

    fn write_script(&self, contents: &str) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("otflash-").suffix(".jlink");
        let mut file = match &self.script_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

impl ScriptRunner for JLinkRunner {
    fn run(&mut self, action: &Action) -> Result<Transcript> {
        let contents = script::render(&action.commands());
        log::debug!("jlink script:\n{}", contents);

        // The script lives only as long as this invocation: the temp file
        // guard removes it on every exit path, including spawn failure.
        let file = self.write_script(&contents)?;

        let output = Command::new(&self.exe)
            .arg("-device")
            .arg(DEVICE)
            .arg("-if")
            .arg(INTERFACE)
            .arg("-speed")
            .arg(SPEED_KHZ.to_string())
            .arg(file.path())
            .output()
            .map_err(|source| Error::Spawn {
                tool: self.exe.display().to_string(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        match output.status.code() {
            Some(0) => log::debug!("{} exited cleanly", JLINK_EXE),
            Some(code) => log::warn!("{} exited with status {}", JLINK_EXE, code),
            None => log::warn!("{} terminated by signal", JLINK_EXE),
        }

        Ok(Transcript {
            output: text,
            status: output.status.code(),
        })
    }

    fn name(&self) -> &str {
        "jlink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn leftover_scripts(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .into_iter()
            .flatten()
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("otflash-") && n.ends_with(".jlink"))
            })
            .collect()
    }

    #[test]
    fn test_script_removed_after_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner =
            JLinkRunner::with_exe(PathBuf::from("true")).with_script_dir(dir.path().to_path_buf());
        let transcript = runner.run(&Action::PinReset).unwrap();
        assert_eq!(transcript.status, Some(0));
        assert!(leftover_scripts(dir.path()).is_empty());
    }

    #[test]
    fn test_script_removed_after_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = JLinkRunner::with_exe(PathBuf::from("/nonexistent/JLinkExe"))
            .with_script_dir(dir.path().to_path_buf());
        assert!(runner.run(&Action::PinReset).is_err());
        assert!(leftover_scripts(dir.path()).is_empty());
    }

    #[test]
    fn test_probe_failure_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner =
            JLinkRunner::with_exe(PathBuf::from("false")).with_script_dir(dir.path().to_path_buf());
        let transcript = runner
            .run(&Action::Reset {
                serial: "1".into(),
            })
            .unwrap();
        assert_eq!(transcript.status, Some(1));
        assert!(!transcript.completed());
        assert!(leftover_scripts(dir.path()).is_empty());
    }
}
