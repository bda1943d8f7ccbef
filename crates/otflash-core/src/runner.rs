//! The seam between command building and probe invocation
//!
//! Command sequences are pure data; running them is not. Everything that
//! talks to a real probe implements [`ScriptRunner`], so the sequencing
//! logic can be exercised against a recording fake instead of hardware.

use crate::action::Action;
use crate::error::Result;

/// Marker line the J-Link Commander prints after a script ran to its end.
pub const COMPLETION_MARKER: &str = "Script processing completed";

/// Captured result of one scripted probe invocation.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Combined console output of the probe process
    pub output: String,
    /// Probe process exit code, if it exited normally
    pub status: Option<i32>,
}

impl Transcript {
    /// Whether the probe reported processing the whole script.
    ///
    /// The probe's exit status is not meaningful for this: the Commander
    /// exits zero on many failures. The completion marker line is the only
    /// signal that every command was consumed.
    pub fn completed(&self) -> bool {
        self.output
            .lines()
            .any(|line| line.trim_start().starts_with(COMPLETION_MARKER))
    }
}

/// Executes one high-level action against a probe backend.
///
/// Implementations materialize the action's command sequence, hand it to
/// the backend and capture the output. They must clean up any on-disk
/// script state regardless of the probe's exit status.
pub trait ScriptRunner {
    /// Run the action and capture the probe output.
    fn run(&mut self, action: &Action) -> Result<Transcript>;

    /// Backend name, for logging.
    fn name(&self) -> &str;
}

/// Extract attached-emulator serial numbers from `ShowEmuList` output.
///
/// The Commander prints one line per emulator, e.g.:
///
/// ```text
/// J-Link[0]: Connection: USB, Serial number: 683214053, ProductName: J-Link OB-SAM3U128
/// ```
pub fn parse_emu_serials(output: &str) -> Vec<String> {
    let mut serials = Vec::new();
    for line in output.lines() {
        if let Some(rest) = line.split("Serial number: ").nth(1) {
            let serial: String = rest.chars().take_while(char::is_ascii_digit).collect();
            if !serial.is_empty() {
                serials.push(serial);
            }
        }
    }
    serials
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_completed_detects_marker() {
        let t = Transcript {
            output: "Processing script file...\nScript processing completed.\n".into(),
            status: Some(0),
        };
        assert!(t.completed());
    }

    #[test]
    fn test_transcript_not_completed_without_marker() {
        let t = Transcript {
            output: "Cannot connect to target.\n".into(),
            status: Some(0),
        };
        assert!(!t.completed());
    }

    #[test]
    fn test_parse_emu_serials() {
        let output = "\
SEGGER J-Link Commander V7.88 (Compiled May  5 2023)\n\
J-Link[0]: Connection: USB, Serial number: 683214053, ProductName: J-Link OB-SAM3U128\n\
J-Link[1]: Connection: USB, Serial number: 683999111, ProductName: J-Link OB-SAM3U128\n";
        assert_eq!(parse_emu_serials(output), ["683214053", "683999111"]);
    }

    #[test]
    fn test_parse_emu_serials_empty_output() {
        assert!(parse_emu_serials("No emulators connected via USB.\n").is_empty());
    }
}
