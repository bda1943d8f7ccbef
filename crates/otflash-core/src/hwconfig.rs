//! Testbed hardware inventory (`hwconfig.ini`)
//!
//! The inventory file is produced and maintained outside this tool, in the
//! Python ConfigParser dialect: one section per device, `key = value` or
//! `key: value` assignments, `;`/`#` comments, option names compared
//! case-insensitively, and a `DEFAULT` section whose values every other
//! section inherits.
//!
//! Recognized options per device section:
//!
//! ```ini
//! [JLink_1]
//! HwModel: nRF52840_OpenThread_Device
//! HwRev: 1.0
//! InterfaceSerialNumber: 683214053
//! USBInterfaceNumber: 0
//! DutSerial: 683214053
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Model string for flashable OpenThread dev boards.
pub const MODEL_NRF52840: &str = "nRF52840_OpenThread_Device";
/// Model string for sniffer boards, never flashed.
pub const MODEL_SNIFFER: &str = "NordicSniffer";

const OPT_MODEL: &str = "hwmodel";
const OPT_REV: &str = "hwrev";
const OPT_INTERFACE_SERIAL: &str = "interfaceserialnumber";
const OPT_INTERFACE_NUMBER: &str = "usbinterfacenumber";
const OPT_DUT_SERIAL: &str = "dutserial";
const OPT_LINUX_PORT: &str = "linuxserialport";
const OPT_MAC_PORT: &str = "macserialport";

/// One configured hardware module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HwModule {
    /// Section name (the operator-chosen device label)
    pub name: String,
    /// Hardware model, e.g. `nRF52840_OpenThread_Device`
    pub model: String,
    /// Hardware revision, if recorded
    pub revision: Option<String>,
    /// USB serial of the debug interface
    pub interface_serial: String,
    /// USB interface number of the CDC console
    pub interface_number: u32,
    /// J-Link serial used to address the board over SWD
    pub dut_serial: Option<String>,
    /// Operator-pinned serial port on Linux hosts
    pub linux_port: Option<String>,
    /// Operator-pinned serial port on macOS hosts
    pub mac_port: Option<String>,
}

impl HwModule {
    /// Whether this module is a flashable dev board (not a sniffer).
    pub fn is_dut_board(&self) -> bool {
        self.model == MODEL_NRF52840
    }
}

/// Parsed hardware inventory.
#[derive(Debug, Clone, Default)]
pub struct HwInventory {
    modules: Vec<HwModule>,
}

impl HwInventory {
    /// Load and parse the inventory file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse inventory text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: Vec<(String, BTreeMap<String, String>)> = Vec::new();
        let mut defaults: BTreeMap<String, String> = BTreeMap::new();
        let mut current: Option<usize> = None;
        let mut in_defaults = false;

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name.eq_ignore_ascii_case("default") {
                    in_defaults = true;
                    current = None;
                } else {
                    in_defaults = false;
                    sections.push((name.to_string(), BTreeMap::new()));
                    current = Some(sections.len() - 1);
                }
                continue;
            }

            let (key, value) = split_assignment(line).ok_or_else(|| Error::HwConfig {
                line: idx + 1,
                message: format!("expected 'key = value', got {:?}", raw),
            })?;

            if in_defaults {
                defaults.insert(key, value);
            } else if let Some(section) = current {
                sections[section].1.insert(key, value);
            } else {
                return Err(Error::HwConfig {
                    line: idx + 1,
                    message: "assignment outside of any section".to_string(),
                });
            }
        }

        let mut modules = Vec::new();
        for (name, options) in sections {
            match build_module(&name, &options, &defaults) {
                Ok(module) => modules.push(module),
                Err(e) => {
                    // Matches the reference behavior: a malformed device
                    // entry is reported and skipped, the rest of the
                    // inventory stays usable.
                    log::warn!("skipping device section [{}]: {}", name, e);
                }
            }
        }

        Ok(Self { modules })
    }

    /// All configured modules, in file order.
    pub fn modules(&self) -> &[HwModule] {
        &self.modules
    }

    /// Flashable dev boards, in file order.
    pub fn dut_boards(&self) -> impl Iterator<Item = &HwModule> {
        self.modules.iter().filter(|m| m.is_dut_board())
    }
}

/// Split a ConfigParser assignment on the first `=` or `:`.
///
/// The option name is lowercased, mirroring ConfigParser's default
/// transformation, so lookups are case-insensitive.
fn split_assignment(line: &str) -> Option<(String, String)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim().to_ascii_lowercase();
    let value = line[pos + 1..].trim().to_string();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn build_module(
    name: &str,
    options: &BTreeMap<String, String>,
    defaults: &BTreeMap<String, String>,
) -> std::result::Result<HwModule, String> {
    let get = |key: &str| -> Option<String> {
        options
            .get(key)
            .or_else(|| defaults.get(key))
            .map(|v| v.to_string())
    };

    let model = get(OPT_MODEL).ok_or_else(|| "missing HwModel".to_string())?;
    let interface_serial = get(OPT_INTERFACE_SERIAL)
        .ok_or_else(|| "missing InterfaceSerialNumber".to_string())?;

    // ConfigParser reads this option as a float, so "1.0" is accepted.
    let interface_number = match get(OPT_INTERFACE_NUMBER) {
        Some(raw) => raw
            .parse::<f64>()
            .map(|n| n as u32)
            .map_err(|_| format!("invalid USBInterfaceNumber {:?}", raw))?,
        None => 0,
    };

    Ok(HwModule {
        name: name.to_string(),
        model,
        revision: get(OPT_REV),
        interface_serial,
        interface_number,
        dut_serial: get(OPT_DUT_SERIAL).filter(|s| !s.is_empty()),
        linux_port: get(OPT_LINUX_PORT),
        mac_port: get(OPT_MAC_PORT),
    })
}
