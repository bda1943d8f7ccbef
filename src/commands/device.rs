//! Scripted probe actions

use otflash_core::error::Result;
use otflash_core::runner::parse_emu_serials;
use otflash_core::{Action, ScriptRunner};

/// Run one action and echo the probe transcript.
pub fn run(runner: &mut dyn ScriptRunner, action: Action) -> Result<()> {
    log::info!("{}", action.describe());

    let transcript = runner.run(&action)?;
    print!("{}", transcript.output);

    if !transcript.completed() {
        log::warn!("probe did not report script completion");
    }

    Ok(())
}

/// Query the probe for attached emulators and print their serial numbers.
pub fn list(runner: &mut dyn ScriptRunner) -> Result<()> {
    let transcript = runner.run(&Action::ShowEmuList)?;
    let serials = parse_emu_serials(&transcript.output);

    if serials.is_empty() {
        println!("No J-Link emulators found.");
        return Ok(());
    }

    println!("Attached J-Link emulators:");
    println!();
    for serial in &serials {
        println!("  {}", serial);
    }

    Ok(())
}
