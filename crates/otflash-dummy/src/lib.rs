//! otflash-dummy - Recording probe fake
//!
//! A probe backend that records every command sequence instead of talking
//! to hardware, and answers with canned Commander output. Useful for dry
//! runs from the CLI (`--probe dummy`) and for asserting on generated
//! sequences in tests.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

use otflash_core::error::Result;
use otflash_core::runner::{ScriptRunner, Transcript, COMPLETION_MARKER};
use otflash_core::{Action, ScriptCommand};

/// Recording fake of a J-Link probe.
pub struct DummyProbe {
    emulators: Vec<String>,
    emit_completion: bool,
    actions: Vec<Action>,
    scripts: Vec<Vec<ScriptCommand>>,
}

impl DummyProbe {
    /// A probe with two pretend emulators attached.
    pub fn new() -> Self {
        Self::with_emulators(&["683214053", "683999111"])
    }

    /// A probe with the given emulator serials attached.
    pub fn with_emulators(serials: &[&str]) -> Self {
        Self {
            emulators: serials.iter().map(|s| s.to_string()).collect(),
            emit_completion: true,
            actions: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Stop emitting the script completion marker, emulating a probe that
    /// lost the target mid-script.
    pub fn without_completion_marker(mut self) -> Self {
        self.emit_completion = false;
        self
    }

    /// Actions run so far, in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Command sequences run so far, in order.
    pub fn scripts(&self) -> &[Vec<ScriptCommand>] {
        &self.scripts
    }

    fn canned_output(&self, action: &Action) -> String {
        let mut out = String::from("SEGGER J-Link Commander (dummy probe)\n");

        if let Action::ShowEmuList = action {
            for (i, serial) in self.emulators.iter().enumerate() {
                out.push_str(&format!(
                    "J-Link[{}]: Connection: USB, Serial number: {}, ProductName: J-Link OB-SAM3U128\n",
                    i, serial
                ));
            }
        } else {
            for cmd in action.commands() {
                out.push_str(&format!("J-Link>{}\n", cmd));
            }
        }

        if self.emit_completion {
            out.push_str(COMPLETION_MARKER);
            out.push_str(".\n");
        }
        out
    }
}

impl Default for DummyProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRunner for DummyProbe {
    fn run(&mut self, action: &Action) -> Result<Transcript> {
        log::debug!("dummy probe: {}", action.describe());
        let output = self.canned_output(action);
        self.actions.push(action.clone());
        self.scripts.push(action.commands());
        Ok(Transcript {
            output,
            status: Some(0),
        })
    }

    fn name(&self) -> &str {
        "dummy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otflash_core::runner::parse_emu_serials;

    #[test]
    fn test_records_sequences_in_order() {
        let mut probe = DummyProbe::new();
        probe
            .run(&Action::EraseAll {
                serial: "42".into(),
            })
            .unwrap();
        probe
            .run(&Action::Flash {
                image: "fw.hex".into(),
                serial: "42".into(),
            })
            .unwrap();

        assert_eq!(probe.scripts().len(), 2);
        assert_eq!(probe.scripts()[0][0].to_string(), "SelectEmuBySN 42");
        assert_eq!(probe.scripts()[1][1].to_string(), "loadfile fw.hex");
    }

    #[test]
    fn test_emu_list_round_trips_through_parser() {
        let mut probe = DummyProbe::with_emulators(&["11", "22"]);
        let transcript = probe.run(&Action::ShowEmuList).unwrap();
        assert_eq!(parse_emu_serials(&transcript.output), ["11", "22"]);
    }

    #[test]
    fn test_completion_marker_toggle() {
        let mut probe = DummyProbe::new().without_completion_marker();
        let transcript = probe.run(&Action::PinReset).unwrap();
        assert!(!transcript.completed());

        let mut probe = DummyProbe::new();
        let transcript = probe.run(&Action::PinReset).unwrap();
        assert!(transcript.completed());
    }
}
