//! otflash - nRF52840 J-Link flashing and testbed-cycle tool
//!
//! # Architecture
//!
//! Every probe interaction goes through a `ScriptRunner` backend:
//! - **jlink** - materializes the command sequence into a temporary script
//!   file and runs `JLinkExe` against it
//! - **dummy** - records the sequence and answers with canned output, for
//!   dry runs and testing without hardware
//!
//! The command sequences themselves live in `otflash-core` as a pure
//! mapping from action to ordered command list; this crate only wires them
//! to the CLI and to the testbed-cycle orchestrator.

mod cli;
mod commands;
mod probes;

use clap::Parser;
use cli::{Cli, Commands};
use otflash_core::Action;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match cli.command {
        Commands::Reset { serial } => probes::with_probe(&cli.probe, |runner| {
            commands::device::run(runner, Action::Reset { serial })
        }),
        Commands::PinReset => {
            probes::with_probe(&cli.probe, |runner| {
                commands::device::run(runner, Action::PinReset)
            })
        }
        Commands::EraseAll { serial } => probes::with_probe(&cli.probe, |runner| {
            commands::device::run(runner, Action::EraseAll { serial })
        }),
        Commands::Flash { image, serial } => probes::with_probe(&cli.probe, |runner| {
            commands::device::run(runner, Action::Flash { image, serial })
        }),
        Commands::FlashSoftdevice { image, serial } => {
            probes::with_probe(&cli.probe, |runner| {
                commands::device::run(runner, Action::FlashSoftdevice { image, serial })
            })
        }
        Commands::Rtt => otflash_jlink::rtt::run_rtt(),
        Commands::Gdbserver => otflash_jlink::rtt::run_gdbserver(),
        Commands::List => {
            probes::with_probe(&cli.probe, |runner| commands::device::list(runner))
        }
        Commands::Devices { hwconfig } => commands::devices::run(hwconfig.as_deref()),
        Commands::Ci { config } => probes::with_probe(&cli.probe, |runner| {
            commands::ci::run(runner, config.as_deref())
        }),
    };

    Ok(result?)
}
