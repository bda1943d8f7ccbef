//! CLI argument parsing

use crate::probes::probe_help;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "otflash")]
#[command(author, version, about = "nRF52840 J-Link flashing and testbed-cycle tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Probe backend to use
    #[arg(long, global = true, default_value = "jlink", help = probe_help())]
    pub probe: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reset a target and let it run
    Reset {
        /// J-Link USB serial number of the target
        serial: String,
    },

    /// Pulse the reset line of the connected target
    PinReset,

    /// Erase the entire flash of a target
    EraseAll {
        /// J-Link USB serial number of the target
        serial: String,
    },

    /// Program a hex image onto a target
    Flash {
        /// Intel HEX image to program
        image: PathBuf,

        /// J-Link USB serial number of the target
        serial: String,
    },

    /// Full erase, then program a softdevice hex image onto a target
    FlashSoftdevice {
        /// Intel HEX softdevice image to program
        image: PathBuf,

        /// J-Link USB serial number of the target
        serial: String,
    },

    /// Open the RTT console against the connected target
    Rtt,

    /// Start the GDB server on port 2331
    Gdbserver,

    /// List attached J-Link emulators
    List,

    /// Show the configured hardware inventory
    Devices {
        /// Hardware inventory file (defaults to the configured path)
        #[arg(long)]
        hwconfig: Option<PathBuf>,
    },

    /// Run one testbed cycle: pull, rebuild, re-flash, test
    Ci {
        /// Tool configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
