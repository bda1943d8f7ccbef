//! otflash-core - Core library for nRF52840 J-Link sequencing
//!
//! This crate provides everything that can be specified without touching
//! hardware or spawning processes:
//!
//! - The mapping from a high-level action (reset, erase-all, flash, ...) to
//!   the ordered J-Link console command sequence it requires. The sequences
//!   are dictated by the nRF52840 memory-mapped register protocol and are
//!   fixed; see [`action`].
//! - The [`runner::ScriptRunner`] trait, the seam between command building
//!   and probe invocation. Real invocation lives in `otflash-jlink`; a
//!   recording fake lives in `otflash-dummy`.
//! - Parsers for the externally maintained testbed inputs: the hardware
//!   inventory (`hwconfig.ini`), the cluster-mode file (`clusters.conf`)
//!   and this tool's own configuration (`otflash.toml`).
//!
//! # Example
//!
//! ```
//! use otflash_core::action::Action;
//!
//! let action = Action::Reset { serial: "683214053".into() };
//! let script: Vec<String> = action.commands().iter().map(|c| c.to_string()).collect();
//! assert_eq!(script, ["SelectEmuBySN 683214053", "r", "g", "exit"]);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod action;
pub mod cluster;
pub mod config;
pub mod error;
pub mod hwconfig;
pub mod runner;
pub mod script;

pub use action::Action;
pub use error::{Error, Result};
pub use runner::{ScriptRunner, Transcript};
pub use script::ScriptCommand;
