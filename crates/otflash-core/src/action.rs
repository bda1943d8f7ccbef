//! High-level probe actions and their fixed command sequences
//!
//! The sequences below are dictated by the nRF52840 register protocol and
//! the J-Link Commander scripting model. Their ordering is load-bearing:
//! NVMC.CONFIG must be switched to erase mode before ERASEALL is pulsed,
//! and back to write mode before an image can be programmed.

use std::path::PathBuf;

use crate::script::ScriptCommand;

/// nRF52840 register addresses and values used by the sequences.
pub mod regs {
    /// NVMC.CONFIG: selects the non-volatile memory controller mode
    pub const NVMC_CONFIG: u32 = 0x4001_E504;
    /// NVMC.ERASEALL: writing 1 starts a full chip erase
    pub const NVMC_ERASEALL: u32 = 0x4001_E50C;
    /// Writing 1 pulls the reset line
    pub const RESET: u32 = 0x4000_0544;

    /// NVMC.CONFIG value enabling writes
    pub const CONFIG_WEN: u32 = 1;
    /// NVMC.CONFIG value enabling erases
    pub const CONFIG_EEN: u32 = 2;
    /// NVMC.ERASEALL value starting the erase
    pub const ERASEALL_START: u32 = 1;
}

/// Script delay after starting a chip erase, in milliseconds.
pub const ERASE_SETTLE_MS: u32 = 100;

/// A high-level probe action.
///
/// [`Action::commands`] is a pure mapping to the ordered command list, so
/// sequences can be asserted on without any hardware attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reset the target selected by USB serial and let it run
    Reset {
        /// J-Link USB serial number
        serial: String,
    },
    /// Pulse the reset line of the connected target
    PinReset,
    /// Erase the entire flash of the target selected by USB serial
    EraseAll {
        /// J-Link USB serial number
        serial: String,
    },
    /// Program a hex image and let the target run
    Flash {
        /// Intel HEX image to program
        image: PathBuf,
        /// J-Link USB serial number
        serial: String,
    },
    /// Full erase, then program a softdevice hex image
    FlashSoftdevice {
        /// Intel HEX softdevice image to program
        image: PathBuf,
        /// J-Link USB serial number
        serial: String,
    },
    /// Query the probe for the list of attached emulators
    ShowEmuList,
}

impl Action {
    /// The ordered J-Link command sequence implementing this action.
    pub fn commands(&self) -> Vec<ScriptCommand> {
        use ScriptCommand::*;

        match self {
            Self::Reset { serial } => vec![SelectEmuBySn(serial.clone()), Reset, Go, Exit],

            Self::PinReset => vec![
                WriteU32 {
                    addr: regs::RESET,
                    value: 1,
                },
                Reset,
                Exit,
            ],

            Self::EraseAll { serial } => vec![
                SelectEmuBySn(serial.clone()),
                Halt,
                WriteU32 {
                    addr: regs::NVMC_CONFIG,
                    value: regs::CONFIG_EEN,
                },
                WriteU32 {
                    addr: regs::NVMC_ERASEALL,
                    value: regs::ERASEALL_START,
                },
                Sleep {
                    millis: ERASE_SETTLE_MS,
                },
                Reset,
                Exit,
            ],

            Self::Flash { image, serial } => vec![
                SelectEmuBySn(serial.clone()),
                LoadFile(image.clone()),
                Reset,
                Go,
                Exit,
            ],

            Self::FlashSoftdevice { image, serial } => vec![
                Halt,
                WriteU32 {
                    addr: regs::NVMC_CONFIG,
                    value: regs::CONFIG_EEN,
                },
                WriteU32 {
                    addr: regs::NVMC_ERASEALL,
                    value: regs::ERASEALL_START,
                },
                Sleep {
                    millis: ERASE_SETTLE_MS,
                },
                Reset,
                Halt,
                WriteU32 {
                    addr: regs::NVMC_CONFIG,
                    value: regs::CONFIG_WEN,
                },
                SelectEmuBySn(serial.clone()),
                LoadFile(image.clone()),
                Reset,
                Go,
                Exit,
            ],

            Self::ShowEmuList => vec![ShowEmuList, Exit],
        }
    }

    /// Short human-readable description for logging.
    pub fn describe(&self) -> String {
        match self {
            Self::Reset { serial } => format!("reset target {}", serial),
            Self::PinReset => "pin reset".to_string(),
            Self::EraseAll { serial } => format!("erase all on target {}", serial),
            Self::Flash { image, serial } => {
                format!("flash {} onto target {}", image.display(), serial)
            }
            Self::FlashSoftdevice { image, serial } => {
                format!("flash softdevice {} onto target {}", image.display(), serial)
            }
            Self::ShowEmuList => "list attached emulators".to_string(),
        }
    }
}
