//! External process execution for checkers.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

/// Exit code reported when a process exceeded its timeout.
pub const EXIT_TIMED_OUT: i32 = 124;
/// Exit code reported when a process could not be launched.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Default wall-clock budget for one checker invocation.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long to wait for output pipes once the process is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Options for one invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Data written to the child's stdin (stdin is closed when absent).
    pub input: Option<String>,

    /// Timeout (None = the runner's default).
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// A launch failure.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(EXIT_NOT_FOUND, "", detail)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Whether the tool never actually ran (timed out, not executable, not found).
    pub fn could_not_run(&self) -> bool {
        (EXIT_TIMED_OUT..=EXIT_NOT_FOUND).contains(&self.exit_code)
    }
}

/// Runs external commands. Implementations never fail: every problem is
/// reported through [`RunOutput::exit_code`].
pub trait ToolRunner: Send + Sync {
    fn run(&self, command: &str, args: &[String], options: &RunOptions) -> RunOutput;
}

/// Spawns real processes, without a shell.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    default_timeout: Duration,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            default_timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Read `source` to the end on a detached thread.
///
/// The reader is never joined: a descendant that inherited the pipe can keep
/// it open long after the child is gone.
fn drain<R: Read + Send + 'static>(source: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut source) = source {
            let _ = source.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

fn collect(rx: &Receiver<String>, wait: Duration) -> String {
    rx.recv_timeout(wait).unwrap_or_default()
}

fn feed_stdin(child: &mut Child, input: Option<&str>) {
    let Some(mut stdin) = child.stdin.take() else {
        return;
    };
    let Some(data) = input.map(str::to_owned) else {
        return;
    };
    thread::spawn(move || {
        // A child that exits early closes the pipe; nothing left to deliver
        let _ = stdin.write_all(data.as_bytes());
    });
}

/// Put the child in its own process group so the whole tree can be killed.
#[cfg(unix)]
fn isolate(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_cmd: &mut Command) {}

#[cfg(unix)]
fn kill_group(child: &Child) {
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: plain syscall on the group created by `isolate`
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// Kill the child and everything it spawned.
fn kill_tree(child: &mut Child) {
    kill_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

impl ToolRunner for ProcessRunner {
    fn run(&self, command: &str, args: &[String], options: &RunOptions) -> RunOutput {
        let timeout = options.timeout.unwrap_or(self.default_timeout);

        let mut cmd = Command::new(command);
        cmd.args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if options.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        isolate(&mut cmd);

        debug!(command, ?args, "Spawning checker process");
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(command, error = %e, "Checker process failed to launch");
                return RunOutput::not_found(format!("{}: {}", command, e));
            }
        };

        feed_stdin(&mut child, options.input.as_deref());
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) if Instant::now() >= deadline => break None,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    kill_tree(&mut child);
                    return RunOutput::not_found(format!("{}: {}", command, e));
                }
            }
        };

        let wait = if status.is_none() {
            debug!(command, ?timeout, "Checker process timed out, killing");
            kill_tree(&mut child);
            DRAIN_GRACE
        } else {
            deadline.saturating_duration_since(Instant::now()).max(DRAIN_GRACE)
        };

        let stdout = collect(&stdout, wait);
        let mut stderr = collect(&stderr, DRAIN_GRACE);

        match status {
            Some(status) => RunOutput {
                exit_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
            },
            None => {
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!(
                    "{} timed out after {} ms",
                    command,
                    timeout.as_millis()
                ));
                RunOutput {
                    exit_code: EXIT_TIMED_OUT,
                    stdout,
                    stderr,
                }
            }
        }
    }
}
