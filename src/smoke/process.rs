//! Proxy child process owned by a background thread.
//!
//! The thread spawns the child and parks the handle in a shared slot; the
//! poller inspects the slot between sleeps. Dropping [`ProxyProcess`]
//! terminates the child with a bounded wait and joins the thread.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;
use wait_timeout::ChildExt;

/// How long teardown waits after SIGTERM before killing.
pub const TERMINATE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Slot {
    Pending,
    Running(Child),
    SpawnFailed(String),
    Reaped,
}

/// What the poller sees on one inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    /// The thread has not spawned the child yet
    NotStarted,
    /// The child is alive
    Running,
    /// The child exited; carries the exit status description
    Exited(String),
    /// The child could not be spawned
    SpawnFailed(String),
}

/// A proxy started on a background thread.
#[derive(Debug)]
pub struct ProxyProcess {
    slot: Arc<Mutex<Slot>>,
    thread: Option<JoinHandle<()>>,
}

impl ProxyProcess {
    /// Start `binary` with `args` on a new thread.
    pub fn start(binary: PathBuf, args: Vec<String>) -> Self {
        let slot = Arc::new(Mutex::new(Slot::Pending));
        let thread_slot = Arc::clone(&slot);

        let thread = std::thread::spawn(move || {
            let spawned = Command::new(&binary)
                .args(&args)
                .stdin(Stdio::null())
                .spawn();
            let mut slot = lock(&thread_slot);
            *slot = match spawned {
                Ok(child) => {
                    log::debug!("Started {} (pid {})", binary.display(), child.id());
                    Slot::Running(child)
                }
                Err(e) => Slot::SpawnFailed(format!("{}: {}", binary.display(), e)),
            };
        });

        Self {
            slot,
            thread: Some(thread),
        }
    }

    /// Inspect the child without blocking.
    pub fn state(&self) -> ProcessState {
        let mut slot = lock(&self.slot);
        match &mut *slot {
            Slot::Pending => ProcessState::NotStarted,
            Slot::SpawnFailed(reason) => ProcessState::SpawnFailed(reason.clone()),
            Slot::Reaped => ProcessState::Exited("already reaped".to_string()),
            Slot::Running(child) => match child.try_wait() {
                Ok(None) => ProcessState::Running,
                Ok(Some(status)) => ProcessState::Exited(status.to_string()),
                Err(e) => ProcessState::Exited(format!("wait failed: {e}")),
            },
        }
    }

    /// Terminate the child, wait for it and join the thread.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(thread) = self.thread.take() {
            // The thread only spawns; joining first guarantees the slot is settled.
            if thread.join().is_err() {
                log::warn!("Proxy launcher thread panicked");
            }
        }

        let mut slot = lock(&self.slot);
        if let Slot::Running(child) = &mut *slot {
            terminate(child);
        }
        *slot = Slot::Reaped;
    }
}

impl Drop for ProxyProcess {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Best-effort termination: SIGTERM, bounded wait, then kill.
fn terminate(child: &mut Child) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }

    send_terminate(child);

    match child.wait_timeout(TERMINATE_TIMEOUT) {
        Ok(Some(status)) => log::debug!("Proxy exited with {}", status),
        Ok(None) => {
            log::warn!(
                "Proxy did not exit within {} seconds of SIGTERM; killing it",
                TERMINATE_TIMEOUT.as_secs()
            );
            let _ = child.kill();
            let _ = child.wait();
        }
        Err(e) => {
            log::warn!("Waiting for proxy failed: {}", e);
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(child.id() as i32);
    if let Err(e) = kill(pid, Signal::SIGTERM) {
        log::warn!("SIGTERM to pid {} failed: {}", pid, e);
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) {
    let _ = child.kill();
}
