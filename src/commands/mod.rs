//! CLI command implementations
//!
//! The scripted probe actions (`device`) and the inventory listing
//! (`devices`) are thin: build the action, hand it to the selected probe
//! backend, show the transcript. The testbed cycle (`ci`) owns the real
//! sequencing: pull, rebuild, stage, re-flash, test.

pub mod ci;
pub mod device;
pub mod devices;
