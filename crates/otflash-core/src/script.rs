//! J-Link console command representation
//!
//! Each variant renders to exactly one line of the J-Link Commander script
//! language. Rendering matches what the Commander console accepts: bare
//! lowercase hex for addresses and values (`w4 4001e504 2`), single-letter
//! reset/go/halt directives.

use std::fmt;
use std::path::PathBuf;

/// One J-Link Commander console directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Select the target emulator by its USB serial number
    SelectEmuBySn(String),
    /// Halt the core (`h`)
    Halt,
    /// Reset the core (`r`)
    Reset,
    /// Resume execution (`g`)
    Go,
    /// 32-bit memory-mapped register write (`w4 <addr> <value>`)
    WriteU32 {
        /// Register address
        addr: u32,
        /// Value to write
        value: u32,
    },
    /// Delay script processing (`sleep <ms>`)
    Sleep {
        /// Delay in milliseconds
        millis: u32,
    },
    /// Program an Intel HEX image (`loadfile <path>`)
    LoadFile(PathBuf),
    /// Query the list of attached emulators
    ShowEmuList,
    /// Terminate the Commander session
    Exit,
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectEmuBySn(sn) => write!(f, "SelectEmuBySN {}", sn),
            Self::Halt => write!(f, "h"),
            Self::Reset => write!(f, "r"),
            Self::Go => write!(f, "g"),
            Self::WriteU32 { addr, value } => write!(f, "w4 {:x} {:x}", addr, value),
            Self::Sleep { millis } => write!(f, "sleep {}", millis),
            Self::LoadFile(path) => write!(f, "loadfile {}", path.display()),
            Self::ShowEmuList => write!(f, "ShowEmuList"),
            Self::Exit => write!(f, "exit"),
        }
    }
}

/// Render a command sequence as the full script file contents.
///
/// The script is materialized once, in final order, with a trailing newline.
pub fn render(commands: &[ScriptCommand]) -> String {
    let mut out = String::new();
    for cmd in commands {
        out.push_str(&cmd.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_write_renders_bare_hex() {
        let cmd = ScriptCommand::WriteU32 {
            addr: 0x4001_E504,
            value: 2,
        };
        assert_eq!(cmd.to_string(), "w4 4001e504 2");
    }

    #[test]
    fn test_render_one_line_per_command() {
        let script = render(&[
            ScriptCommand::SelectEmuBySn("683214053".into()),
            ScriptCommand::Reset,
            ScriptCommand::Go,
            ScriptCommand::Exit,
        ]);
        assert_eq!(script, "SelectEmuBySN 683214053\nr\ng\nexit\n");
    }

    #[test]
    fn test_loadfile_keeps_exact_path() {
        let cmd = ScriptCommand::LoadFile(PathBuf::from("/opt/images/ot-cli-ftd.hex"));
        assert_eq!(cmd.to_string(), "loadfile /opt/images/ot-cli-ftd.hex");
    }
}
