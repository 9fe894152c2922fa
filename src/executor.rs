//! Runs the target executable against one fixture and captures what it prints.
//!
//! Standard output and standard error share a single pipe, so the captured
//! stream interleaves them in the order the kernel received the writes, the
//! same as a shell `2>&1` redirection.

use std::fs::File;
use std::io::{self, Read};
use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::debug;
use wait_timeout::ChildExt;

use crate::config::HarnessConfig;
use crate::error::ExecutionError;

/// Output of one run, split into lines.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub lines: Vec<String>,
}

impl CapturedOutput {
    pub fn from_bytes(status: ExitStatus, bytes: &[u8]) -> Self {
        Self {
            status,
            lines: split_lines(bytes),
        }
    }

    /// The captured lines joined back together, for failure messages.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Splits on `\n`, dropping a trailing `\r` from each line. A final line
/// without a terminator still counts.
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_owned)
        .collect()
}

/// Spawns `<program> <leading args> <fixture> <extra args>` and waits for it.
///
/// Returns once the process has exited and its output pipe has been drained.
/// With a timeout, both the exit and the drain must happen before the same
/// deadline; a background process still holding the pipe counts as a hang.
pub fn run(config: &HarnessConfig, fixture: &Path) -> Result<CapturedOutput, ExecutionError> {
    if config.program.as_os_str().is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }
    let program = config.program_label();

    let (reader, writer) = capture_pipe().map_err(ExecutionError::Capture)?;
    let writer_err = writer.try_clone().map_err(ExecutionError::Capture)?;

    let mut command = Command::new(&config.program);
    command
        .args(&config.leading_args)
        .arg(fixture)
        .args(&config.extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(writer))
        .stderr(Stdio::from(writer_err));
    if config.timeout.is_some() {
        // Own process group so a timeout can take down grandchildren too.
        command.process_group(0);
    }
    let spawned = command.spawn();
    // The command still holds our write ends; the reader sees EOF only once they are gone.
    drop(command);
    let mut child = spawned.map_err(|source| ExecutionError::Spawn {
        program: program.clone(),
        source,
    })?;
    let deadline = config.timeout.map(|limit| (Instant::now() + limit, limit));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = File::from(reader).read_to_end(&mut buf).map(|_| buf);
        // The receiver is gone once the run has given up on this child.
        let _ = tx.send(result);
    });

    let status = wait(&mut child, deadline, &program)?;
    let drained = match deadline {
        None => rx.recv().map_err(|_| reader_lost())?,
        Some((at, limit)) => match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                // The child is reaped, but whatever inherited the pipe is still in its group.
                signal_group(child.id());
                return Err(ExecutionError::TimedOut {
                    program,
                    timeout: limit,
                });
            }
            Err(RecvTimeoutError::Disconnected) => return Err(reader_lost()),
        },
    };
    let bytes = drained.map_err(ExecutionError::Capture)?;

    debug!(
        program = %program,
        fixture = %fixture.display(),
        status = ?status.code(),
        bytes = bytes.len(),
        "target finished"
    );
    Ok(CapturedOutput::from_bytes(status, &bytes))
}

fn reader_lost() -> ExecutionError {
    ExecutionError::Capture(io::Error::other("output reader panicked"))
}

fn wait(
    child: &mut Child,
    deadline: Option<(Instant, Duration)>,
    program: &str,
) -> Result<ExitStatus, ExecutionError> {
    let waited = match deadline {
        None => child.wait().map(Some),
        Some((at, _)) => child.wait_timeout(at.saturating_duration_since(Instant::now())),
    };
    match waited {
        Ok(Some(status)) => Ok(status),
        Ok(None) => {
            kill_group(child);
            Err(ExecutionError::TimedOut {
                program: program.to_owned(),
                timeout: deadline.map(|(_, limit)| limit).unwrap_or_default(),
            })
        }
        Err(source) => {
            kill_group(child);
            Err(ExecutionError::Wait {
                program: program.to_owned(),
                source,
            })
        }
    }
}

/// Kills the child's process group (or just the child) and reaps it.
fn kill_group(child: &mut Child) {
    if !signal_group(child.id()) {
        let _ = child.kill();
    }
    let _ = child.wait();
}

fn signal_group(pid: u32) -> bool {
    match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, pid, "killpg failed");
            false
        }
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn capture_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    use nix::fcntl::OFlag;
    Ok(nix::unistd::pipe2(OFlag::O_CLOEXEC)?)
}

// No pipe2 here; the ends are briefly inheritable by children spawned concurrently.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn capture_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    Ok(nix::unistd::pipe()?)
}
