//! Hardware inventory listing

use std::path::Path;

use otflash_core::config::CiConfig;
use otflash_core::error::Result;
use otflash_core::hwconfig::HwInventory;

/// Print the configured hardware inventory.
pub fn run(hwconfig: Option<&Path>) -> Result<()> {
    let path = match hwconfig {
        Some(path) => path.to_path_buf(),
        None => CiConfig::load(None)?.paths.hwconfig,
    };

    let inventory = HwInventory::load(&path)?;

    println!("Hardware inventory from {}:", path.display());
    println!();
    println!(
        "{:<16} {:<28} {:>14} {:>5} {:>12}",
        "Name", "Model", "Interface SN", "USB#", "DUT serial"
    );
    println!("{}", "-".repeat(80));

    for module in inventory.modules() {
        println!(
            "{:<16} {:<28} {:>14} {:>5} {:>12}",
            module.name,
            module.model,
            module.interface_serial,
            module.interface_number,
            module.dut_serial.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!(
        "{} device(s), {} flashable dev board(s)",
        inventory.modules().len(),
        inventory.dut_boards().count()
    );

    Ok(())
}
