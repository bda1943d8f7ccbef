//! Testbed cycle orchestration
//!
//! One cycle handles the two managed components in order: the firmware
//! source tree, then the userland driver. A component whose repository
//! reports already-up-to-date is skipped entirely. A changed firmware tree
//! is rebuilt, its image staged, every configured dev board re-flashed and
//! the test suite launched; a changed driver is rebuilt and the suite
//! launched.
//!
//! External tools surface their own output. Their exit codes are logged,
//! never inspected to abort the cycle: a board that failed to flash is
//! reported and the run proceeds to the tests regardless.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use otflash_core::cluster;
use otflash_core::config::{CiConfig, FirmwareConfig};
use otflash_core::error::{Error, Result};
use otflash_core::hwconfig::HwInventory;
use otflash_core::{Action, ScriptRunner};

/// Timestamp format for per-run results directories.
const RESULTS_STAMP: &str = "%b%d%Y_%H_%M_%S";
/// Timestamp format for the date-stamped image copy.
const IMAGE_STAMP: &str = "%Y%m%d_%H%M%S";
/// File receiving the accumulated flash transcript.
const FLASH_LOG: &str = "nrf52840_flash.log";

/// Up-to-date markers printed by `git pull`. The spelling changed across
/// git releases; both are in the field.
const UP_TO_DATE_MARKERS: [&str; 2] = ["Already up to date", "Already up-to-date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PullStatus {
    UpToDate,
    Changed,
}

/// Per-board outcome of a flash pass.
#[derive(Debug)]
struct FlashReport {
    name: String,
    serial: String,
    ok: bool,
}

/// Run one full testbed cycle.
pub fn run(runner: &mut dyn ScriptRunner, config_path: Option<&Path>) -> Result<()> {
    let cfg = CiConfig::load(config_path)?;
    log::debug!("probe backend: {}", runner.name());

    let mode = cluster::thread_mode_for(&cfg.paths.clusters, cfg.paths.host.as_deref());
    log::info!("testbed thread mode: {}", mode);

    let results_dir = cfg
        .paths
        .results_dir
        .join(Local::now().format(RESULTS_STAMP).to_string());

    match pull(&cfg.firmware.repo)? {
        PullStatus::UpToDate => log::info!("firmware already up to date, skipping"),
        PullStatus::Changed => {
            build(&cfg.firmware.repo, &cfg.firmware.build)?;
            let image = stage_image(&cfg)?;

            let inventory = HwInventory::load(&cfg.paths.hwconfig)?;
            let (reports, transcript) =
                flash_boards(runner, &inventory, &image, &cfg.firmware)?;
            write_flash_log(&results_dir, &transcript)?;
            summarize(&reports);

            run_tests(&cfg, &results_dir)?;
        }
    }

    match pull(&cfg.driver.repo)? {
        PullStatus::UpToDate => log::info!("driver already up to date, skipping"),
        PullStatus::Changed => {
            build(&cfg.driver.repo, &cfg.driver.build)?;
            run_tests(&cfg, &results_dir)?;
        }
    }

    Ok(())
}

/// Decide whether a pull left the tree unchanged, from its stdout alone.
fn classify_pull(stdout: &str) -> PullStatus {
    if UP_TO_DATE_MARKERS.iter().any(|m| stdout.contains(m)) {
        PullStatus::UpToDate
    } else {
        PullStatus::Changed
    }
}

fn pull(repo: &Path) -> Result<PullStatus> {
    log::info!("pulling {}", repo.display());

    // LC_ALL pins git's message catalog so the marker scan stays stable.
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .arg("pull")
        .env("LC_ALL", "C")
        .output()
        .map_err(|source| Error::Spawn {
            tool: "git".to_string(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    log::debug!("git pull: {}", stdout.trim_end());
    if !output.status.success() {
        log::warn!(
            "git pull in {} exited with {}: {}",
            repo.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }

    Ok(classify_pull(&stdout))
}

fn build(repo: &Path, command: &str) -> Result<()> {
    log::info!("building in {}: {}", repo.display(), command);

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(repo)
        .status()
        .map_err(|source| Error::Spawn {
            tool: command.to_string(),
            source,
        })?;

    if !status.success() {
        log::warn!("build command exited with {}", status);
    }

    Ok(())
}

/// Copy the built hex image into the image directory under its stable name
/// and a date-stamped name. Returns the stable path, which is what gets
/// flashed.
fn stage_image(cfg: &CiConfig) -> Result<PathBuf> {
    let source = cfg.firmware.repo.join(&cfg.firmware.image);
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ot-cli-ftd.hex".to_string());

    fs::create_dir_all(&cfg.paths.image_dir)?;

    let stable = cfg.paths.image_dir.join(&file_name);
    fs::copy(&source, &stable).map_err(|err| Error::ReadFile {
        path: source.clone(),
        source: err,
    })?;

    let stamp = Local::now().format(IMAGE_STAMP);
    let dated_name = match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, stamp, ext),
        None => format!("{}_{}", file_name, stamp),
    };
    let dated = cfg.paths.image_dir.join(dated_name);
    fs::copy(&stable, &dated)?;

    log::info!(
        "staged image at {} and {}",
        stable.display(),
        dated.display()
    );
    Ok(stable)
}

/// Erase and re-flash every configured dev board, collecting per-board
/// outcomes and the combined probe transcript.
fn flash_boards(
    runner: &mut dyn ScriptRunner,
    inventory: &HwInventory,
    image: &Path,
    fw: &FirmwareConfig,
) -> Result<(Vec<FlashReport>, String)> {
    let boards: Vec<_> = inventory.dut_boards().collect();

    let pb = ProgressBar::new(boards.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut reports = Vec::new();
    let mut transcript = String::new();

    for board in boards {
        let Some(serial) = board.dut_serial.clone() else {
            log::warn!("{} has no DutSerial, cannot flash it", board.name);
            pb.inc(1);
            continue;
        };

        pb.set_message(board.name.clone());

        let erase = runner.run(&Action::EraseAll {
            serial: serial.clone(),
        })?;
        transcript.push_str(&erase.output);
        thread::sleep(Duration::from_secs(fw.erase_settle_secs));

        let flash = runner.run(&Action::Flash {
            image: image.to_path_buf(),
            serial: serial.clone(),
        })?;
        transcript.push_str(&flash.output);
        thread::sleep(Duration::from_secs(fw.flash_settle_secs));

        let ok = erase.completed() && flash.completed();
        if !ok {
            log::warn!("{} ({}) did not report flash completion", board.name, serial);
        }

        reports.push(FlashReport {
            name: board.name.clone(),
            serial,
            ok,
        });
        pb.inc(1);
    }

    pb.finish_with_message("flash pass done");
    Ok((reports, transcript))
}

fn write_flash_log(results_dir: &Path, transcript: &str) -> Result<()> {
    fs::create_dir_all(results_dir)?;
    let path = results_dir.join(FLASH_LOG);
    fs::write(&path, transcript)?;
    log::info!("flash transcript written to {}", path.display());
    Ok(())
}

fn summarize(reports: &[FlashReport]) {
    let ok = reports.iter().filter(|r| r.ok).count();
    println!("Flashed {}/{} board(s)", ok, reports.len());
    for report in reports {
        let verdict = if report.ok { "ok" } else { "no completion marker" };
        println!("  {} ({}): {}", report.name, report.serial, verdict);
    }
}

fn run_tests(cfg: &CiConfig, results_dir: &Path) -> Result<()> {
    fs::create_dir_all(results_dir)?;

    let command = format!(
        "{} -d {} {}",
        cfg.tests.runner,
        results_dir.display(),
        cfg.tests.pattern
    );
    log::info!("running tests in {}: {}", cfg.tests.dir.display(), command);

    let status = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .current_dir(&cfg.tests.dir)
        .status()
        .map_err(|source| Error::Spawn {
            tool: cfg.tests.runner.clone(),
            source,
        })?;

    if !status.success() {
        log::warn!("test runner exited with {}", status);
    }

    Ok(())
}
