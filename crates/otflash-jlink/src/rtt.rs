//! Interactive probe modes: RTT console and GDB server
//!
//! Neither mode is scripted. RTT needs the Commander running as a
//! connection server in the background while the interactive client owns
//! the terminal; the GDB server simply runs in the foreground until the
//! user ends it.

use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use otflash_core::error::{Error, Result};

use crate::{DEVICE, INTERFACE, JLINK_EXE, SPEED_KHZ};

/// RTT client binary name.
pub const RTT_CLIENT_EXE: &str = "JLinkRTTClient";
/// GDB server binary name.
pub const GDB_SERVER_EXE: &str = "JLinkGDBServer";
/// Port the GDB server listens on.
pub const GDB_PORT: u16 = 2331;

/// Delay giving the background connection server time to attach.
const SERVER_SETTLE: Duration = Duration::from_secs(1);

/// Kills the background connection server when dropped, so termination
/// happens on every exit path of the foreground client: normal exit,
/// client failure, or an interrupt unwinding the stack.
struct ServerGuard {
    child: Child,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("connection server already gone: {}", e);
        }
        if let Err(e) = self.child.wait() {
            log::debug!("failed to reap connection server: {}", e);
        }
    }
}

fn find_tool(name: &str) -> Result<std::path::PathBuf> {
    which::which(name).map_err(|_| Error::ToolNotFound {
        name: name.to_string(),
    })
}

/// Run the RTT console: Commander as background connection server, RTT
/// client in the foreground until it ends.
pub fn run_rtt() -> Result<()> {
    let server_exe = find_tool(JLINK_EXE)?;
    let client_exe = find_tool(RTT_CLIENT_EXE)?;

    log::info!("starting RTT connection server");
    let child = Command::new(&server_exe)
        .arg("-device")
        .arg(DEVICE)
        .arg("-if")
        .arg(INTERFACE)
        .arg("-speed")
        .arg(SPEED_KHZ.to_string())
        .arg("-autoconnect")
        .arg("1")
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| Error::Spawn {
            tool: server_exe.display().to_string(),
            source,
        })?;
    let _server = ServerGuard { child };

    thread::sleep(SERVER_SETTLE);

    let status = Command::new(&client_exe)
        .status()
        .map_err(|source| Error::Spawn {
            tool: client_exe.display().to_string(),
            source,
        })?;
    log::info!("RTT client ended with {}", status);

    Ok(())
}

/// Run the GDB server on [`GDB_PORT`] in the foreground.
pub fn run_gdbserver() -> Result<()> {
    let exe = find_tool(GDB_SERVER_EXE)?;

    log::info!("starting GDB server on port {}", GDB_PORT);
    let status = Command::new(&exe)
        .arg("-device")
        .arg(DEVICE)
        .arg("-if")
        .arg(INTERFACE)
        .arg("-speed")
        .arg(SPEED_KHZ.to_string())
        .arg("-port")
        .arg(GDB_PORT.to_string())
        .status()
        .map_err(|source| Error::Spawn {
            tool: exe.display().to_string(),
            source,
        })?;
    log::info!("GDB server ended with {}", status);

    Ok(())
}
