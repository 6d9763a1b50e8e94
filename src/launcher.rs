//! Detached command execution

use std::{
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};

use log::{info, warn};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use snafu::ResultExt;

use crate::errors::{ChildReaperSnafu, DockError};

/// Runs shell commands without waiting for them.
pub(crate) trait Launcher {
    /// Start `command`. Failures are logged, never reported.
    fn launch(&mut self, command: &str);
}

/// Launches commands through `/bin/sh -c`.
///
/// Requires [`install_child_reaper`] so exited children do not linger as
/// zombies.
#[derive(Debug, Default)]
pub(crate) struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn launch(&mut self, command: &str) {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // SAFETY: Only calls sigaction, which is async-signal-safe. The ignored
        //         SIGCHLD disposition would otherwise be inherited by the shell.
        unsafe {
            cmd.pre_exec(|| {
                signal::signal(Signal::SIGCHLD, SigHandler::SigDfl)?;
                Ok(())
            });
        }
        match cmd.spawn() {
            // Dropping the handle does not wait. The kernel reaps the child.
            Ok(child) => info!("Launched {command:?} as pid {}", child.id()),
            Err(e) => warn!("Failed to launch {command:?}: {e}"),
        }
    }
}

/// Let the kernel reap exited children for the rest of the process lifetime.
pub(crate) fn install_child_reaper() -> Result<(), DockError> {
    let action = SigAction::new(SigHandler::SigIgn, SaFlags::SA_NOCLDWAIT, SigSet::empty());
    // SAFETY: Installs no handler function, only the ignore disposition.
    unsafe { signal::sigaction(Signal::SIGCHLD, &action) }.context(ChildReaperSnafu)?;
    Ok(())
}
