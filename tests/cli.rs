//! CLI-level tests against the dummy probe backend
//!
//! Nothing here needs J-Link hardware or the SEGGER tools: the dummy probe
//! records sequences and answers with canned output, and the testbed-cycle
//! tests run against throwaway git repositories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn otflash() -> Command {
    Command::cargo_bin("otflash").unwrap()
}

#[test]
fn unknown_action_prints_usage_and_nothing_else() {
    otflash()
        .arg("bogus-action")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn flash_with_dummy_probe_prints_sequence() {
    otflash()
        .args(["--probe", "dummy", "flash", "fw.hex", "683214053"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SelectEmuBySN 683214053"))
        .stdout(predicate::str::contains("loadfile fw.hex"))
        .stdout(predicate::str::contains("Script processing completed"));
}

#[test]
fn erase_all_with_dummy_probe_prints_register_writes() {
    otflash()
        .args(["--probe", "dummy", "erase-all", "683214053"])
        .assert()
        .success()
        .stdout(predicate::str::contains("w4 4001e504 2"))
        .stdout(predicate::str::contains("w4 4001e50c 1"));
}

#[test]
fn list_with_dummy_probe_prints_serials() {
    otflash()
        .args(["--probe", "dummy", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attached J-Link emulators:"))
        .stdout(predicate::str::contains("683214053"))
        .stdout(predicate::str::contains("683999111"));
}

#[test]
fn unknown_probe_backend_is_rejected() {
    otflash()
        .args(["--probe", "stlink", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown probe backend: stlink"));
}

#[test]
fn devices_prints_inventory_table() {
    let tmp = TempDir::new().unwrap();
    let hwconfig = tmp.path().join("hwconfig.ini");
    fs::write(&hwconfig, sample_inventory()).unwrap();

    otflash()
        .arg("devices")
        .arg("--hwconfig")
        .arg(&hwconfig)
        .assert()
        .success()
        .stdout(predicate::str::contains("JLink_1"))
        .stdout(predicate::str::contains("nRF52840_OpenThread_Device"))
        .stdout(predicate::str::contains("3 device(s), 2 flashable dev board(s)"));
}

// =============================================================================
// Testbed cycle
// =============================================================================

fn sample_inventory() -> &'static str {
    "\
[JLink_1]\n\
HwModel: nRF52840_OpenThread_Device\n\
InterfaceSerialNumber: 683214053\n\
USBInterfaceNumber: 0\n\
DutSerial: 683214053\n\
\n\
[JLink_2]\n\
HwModel: nRF52840_OpenThread_Device\n\
InterfaceSerialNumber: 683999111\n\
USBInterfaceNumber: 1\n\
DutSerial: 683999111\n\
\n\
[Sniffer_1]\n\
HwModel: NordicSniffer\n\
InterfaceSerialNumber: 683555222\n\
USBInterfaceNumber: 0\n"
}

fn git(args: &[&str], cwd: &Path) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(cwd)
        .env("LC_ALL", "C")
        .status()
        .unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

fn commit(repo: &Path, message: &str) {
    git(
        &[
            "-c",
            "user.email=testbed@example.com",
            "-c",
            "user.name=testbed",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--allow-empty",
            "-m",
            message,
            "-q",
        ],
        repo,
    );
}

/// An upstream repository plus a clone the tool will pull in.
fn repo_pair(root: &Path, name: &str) -> (PathBuf, PathBuf) {
    let upstream = root.join(format!("{}-upstream", name));
    let clone = root.join(name);

    fs::create_dir(&upstream).unwrap();
    git(&["init", "-q"], &upstream);
    commit(&upstream, "init");
    git(
        &[
            "clone",
            "-q",
            upstream.to_str().unwrap(),
            clone.to_str().unwrap(),
        ],
        root,
    );

    (upstream, clone)
}

struct Testbed {
    _tmp: TempDir,
    config: PathBuf,
    firmware_upstream: PathBuf,
    images: PathBuf,
    results: PathBuf,
    tests_dir: PathBuf,
}

fn testbed() -> Testbed {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let (firmware_upstream, firmware) = repo_pair(root, "firmware");
    let (_driver_upstream, driver) = repo_pair(root, "driver");

    let images = root.join("images");
    let results = root.join("results");
    let tests_dir = root.join("tests");
    fs::create_dir(&tests_dir).unwrap();
    fs::write(tests_dir.join("mark.sh"), "touch ran.marker\n").unwrap();

    let hwconfig = root.join("hwconfig.ini");
    fs::write(&hwconfig, sample_inventory()).unwrap();

    // Pretend build output, staged by the cycle when firmware changed.
    fs::create_dir_all(firmware.join("out")).unwrap();
    fs::write(firmware.join("out/ot-cli-ftd.hex"), ":00000001FF\n").unwrap();

    let config = root.join("otflash.toml");
    fs::write(
        &config,
        format!(
            r#"
[firmware]
repo = "{firmware}"
build = "true"
image = "out/ot-cli-ftd.hex"
erase_settle_secs = 0
flash_settle_secs = 0

[driver]
repo = "{driver}"
build = "true"

[paths]
image_dir = "{images}"
results_dir = "{results}"
hwconfig = "{hwconfig}"
clusters = "{clusters}"

[tests]
runner = "sh mark.sh"
dir = "{tests_dir}"
pattern = "ot_test_*.py"
"#,
            firmware = firmware.display(),
            driver = driver.display(),
            images = images.display(),
            results = results.display(),
            hwconfig = hwconfig.display(),
            clusters = root.join("clusters.conf").display(),
            tests_dir = tests_dir.display(),
        ),
    )
    .unwrap();

    Testbed {
        _tmp: tmp,
        config,
        firmware_upstream,
        images,
        results,
        tests_dir,
    }
}

#[test]
fn ci_skips_everything_when_up_to_date() {
    let bed = testbed();

    otflash()
        .env("RUST_LOG", "info")
        .args(["--probe", "dummy", "ci", "--config"])
        .arg(&bed.config)
        .assert()
        .success()
        .stderr(predicate::str::contains("firmware already up to date"))
        .stderr(predicate::str::contains("driver already up to date"));

    // Zero flash operations, zero test-runner invocations.
    assert!(!bed.images.exists());
    assert!(!bed.results.exists());
    assert!(!bed.tests_dir.join("ran.marker").exists());
}

#[test]
fn ci_flashes_boards_and_runs_tests_when_firmware_changed() {
    let bed = testbed();
    commit(&bed.firmware_upstream, "new firmware");

    otflash()
        .args(["--probe", "dummy", "ci", "--config"])
        .arg(&bed.config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Flashed 2/2 board(s)"));

    // Image staged under stable and date-stamped names.
    assert!(bed.images.join("ot-cli-ftd.hex").exists());
    assert_eq!(fs::read_dir(&bed.images).unwrap().count(), 2);

    // One results directory holding the flash transcript.
    let run_dirs: Vec<_> = fs::read_dir(&bed.results)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(run_dirs.len(), 1);
    let flash_log = fs::read_to_string(run_dirs[0].join("nrf52840_flash.log")).unwrap();
    assert!(flash_log.contains("SelectEmuBySN 683214053"));
    assert!(flash_log.contains("SelectEmuBySN 683999111"));
    assert!(flash_log.contains("loadfile"));

    // Test runner was invoked from the tests directory.
    assert!(bed.tests_dir.join("ran.marker").exists());

    // The clone is now current: a second cycle does nothing new.
    fs::remove_file(bed.tests_dir.join("ran.marker")).unwrap();
    otflash()
        .env("RUST_LOG", "info")
        .args(["--probe", "dummy", "ci", "--config"])
        .arg(&bed.config)
        .assert()
        .success()
        .stderr(predicate::str::contains("firmware already up to date"));
    assert!(!bed.tests_dir.join("ran.marker").exists());
}
