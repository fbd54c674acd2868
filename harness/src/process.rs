//! Child processes with a deadline and a cancellation flag.
//!
//! On Unix every child leads its own process group, so killing it also
//! kills whatever the driver started (`cc1`, `as`, `collect2`).

use std::io;
use std::process::{Child, Command, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

const POLL_START: Duration = Duration::from_millis(1);
const POLL_MAX: Duration = Duration::from_millis(25);

/// Shared flag telling workers to stop.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a supervised child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Exited on its own with this status.
    Exited(ExitStatus),
    /// Killed after the deadline passed.
    TimedOut,
    /// Killed because the token was cancelled.
    Cancelled,
}

#[cfg(unix)]
fn kill_group(child: &Child) -> io::Result<()> {
    let pgid = libc::pid_t::try_from(child.id()).map_err(io::Error::other)?;
    // SAFETY: killpg takes no pointers; the group is the one the child leads.
    if unsafe { libc::killpg(pgid, libc::SIGKILL) } == -1 {
        let err = io::Error::last_os_error();
        // ESRCH: the whole group is already gone.
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err);
        }
    }
    Ok(())
}

fn kill_and_reap(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    kill_group(child)?;
    // The child may have exited between the last poll and the kill.
    match child.kill() {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
        Err(e) => return Err(e),
    }
    child.wait().map(|_| ())
}

/// Spawns `cmd` and waits for it, killing it on timeout or cancellation.
///
/// The child is always reaped before this returns. On Unix it is started in
/// a new process group, and a kill reaches the whole group.
///
/// # Errors
///
/// Returns the I/O error if the command cannot be spawned or waited on.
pub fn run_with_deadline(
    cmd: &mut Command,
    timeout: Duration,
    cancel: &CancelToken,
) -> io::Result<ChildExit> {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    let mut child = cmd.spawn()?;
    let started = Instant::now();
    let mut poll = POLL_START;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(ChildExit::Exited(status));
        }
        if cancel.is_cancelled() {
            debug!(pid = child.id(), "cancelled, killing child");
            kill_and_reap(&mut child)?;
            return Ok(ChildExit::Cancelled);
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            debug!(pid = child.id(), ?elapsed, "deadline passed, killing child");
            kill_and_reap(&mut child)?;
            return Ok(ChildExit::TimedOut);
        }
        thread::sleep(poll.min(timeout - elapsed));
        poll = (poll * 2).min(POLL_MAX);
    }
}

#[cfg(unix)]
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_interrupt(signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
    // A second interrupt terminates the process outright.
    // SAFETY: signal(2) is async-signal-safe.
    unsafe {
        libc::signal(signal, libc::SIG_DFL);
    }
}

/// Cancels `token` when the process receives SIGINT or SIGTERM.
///
/// Toolchain children run in their own process groups and never see a
/// terminal interrupt, so the token is what stops them and lets every
/// scratch directory be dropped. A second signal falls back to the default
/// action. Does nothing on platforms without POSIX signals.
///
/// # Errors
///
/// Returns the OS error if a handler cannot be installed or the watcher
/// thread cannot be started.
pub fn cancel_on_interrupt(token: &CancelToken) -> io::Result<()> {
    #[cfg(unix)]
    {
        let handler = on_interrupt as extern "C" fn(libc::c_int);
        for signal in [libc::SIGINT, libc::SIGTERM] {
            // SAFETY: the handler only touches an atomic and calls signal(2).
            if unsafe { libc::signal(signal, handler as libc::sighandler_t) } == libc::SIG_ERR {
                return Err(io::Error::last_os_error());
            }
        }
        let token = token.clone();
        thread::Builder::new()
            .name("neon-interrupt".to_string())
            .spawn(move || {
                while !INTERRUPTED.load(Ordering::SeqCst) {
                    thread::sleep(POLL_MAX);
                }
                debug!("interrupted, cancelling the batch");
                token.cancel();
            })?;
    }
    #[cfg(not(unix))]
    let _ = token;
    Ok(())
}
