//! Subprocess execution with timeout enforcement and bounded output capture.
//!
//! A non-zero exit never surfaces as an error to callers: every failure mode
//! (non-zero exit, timeout, spawn failure) is folded into the returned
//! [`CommandOutcome`] so the install loop can classify it.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

/// Exit code reported when a command exceeds its timeout.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code reported when the program could not be spawned at all.
pub const SPAWN_EXIT_CODE: i32 = 127;

/// Captured output per stream is capped to bound memory on chatty installs.
const MAX_CAPTURE_BYTES: usize = 10 * 1024 * 1024;

/// Options for a single command execution
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Working directory for the child process
    pub cwd: Option<PathBuf>,
    /// Hard deadline; the child is killed on expiry
    pub timeout: Duration,
    /// Extra environment variables layered over the inherited environment
    pub env: Vec<(String, String)>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            timeout: Duration::from_secs(300),
            env: Vec::new(),
        }
    }
}

/// What happened when a command ran
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub timed_out: bool,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Synthesize a failed outcome without running anything
    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
            timed_out: false,
        }
    }
}

/// Run a command to completion, capturing output.
///
/// Spawns exactly one child per call; retry policy belongs to callers.
pub fn execute(program: &str, args: &[String], opts: &ExecOptions) -> CommandOutcome {
    let started = Instant::now();
    log::debug!("Executing: {} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null()) // Prevent hangs from interactive prompts
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &opts.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &opts.env {
        cmd.env(key, value);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log::debug!("Failed to spawn {program}: {e}");
            return CommandOutcome {
                exit_code: SPAWN_EXIT_CODE,
                stdout: String::new(),
                stderr: format!("failed to spawn {program}: {e}"),
                duration: started.elapsed(),
                timed_out: false,
            };
        }
    };

    // Drain both pipes on threads so a full pipe buffer cannot stall the child
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let (exit_code, timed_out) = match child.wait_timeout(opts.timeout) {
        Ok(Some(status)) => (status.code().unwrap_or(-1), false),
        Ok(None) => {
            log::warn!(
                "Command timed out after {}s: {program}",
                opts.timeout.as_secs()
            );
            let _ = child.kill();
            let _ = child.wait();
            (TIMEOUT_EXIT_CODE, true)
        }
        Err(e) => {
            log::debug!("Failed waiting on {program}: {e}");
            let _ = child.kill();
            let _ = child.wait();
            (-1, false)
        }
    };

    let stdout = join_reader(stdout_reader);
    let stderr = join_reader(stderr_reader);
    let duration = started.elapsed();
    log::debug!("Command exited with code {exit_code} in {}ms", duration.as_millis());

    CommandOutcome {
        exit_code,
        stdout,
        stderr,
        duration,
        timed_out,
    }
}

/// Check if an executable exists on PATH
pub fn command_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

/// First line of `<command> --version`, falling back to `-v`
pub fn command_version(name: &str) -> Option<String> {
    let opts = ExecOptions {
        timeout: Duration::from_secs(5),
        ..Default::default()
    };

    for flag in ["--version", "-v"] {
        let outcome = execute(name, &[flag.to_string()], &opts);
        if outcome.success() {
            if let Some(line) = outcome.stdout.lines().next() {
                return Some(line.trim().to_string());
            }
        }
    }
    None
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut captured: Vec<u8> = Vec::with_capacity(8 * 1024);
        let mut buf = [0u8; 8 * 1024];
        let mut truncated = false;
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if captured.len() < MAX_CAPTURE_BYTES {
                        let take = n.min(MAX_CAPTURE_BYTES - captured.len());
                        captured.extend_from_slice(&buf[..take]);
                        if take < n {
                            truncated = true;
                        }
                    } else {
                        // Keep draining so the child never blocks on a full pipe
                        truncated = true;
                    }
                }
                Err(_) => break,
            }
        }
        let mut text = String::from_utf8_lossy(&captured).into_owned();
        if truncated {
            text.push_str("\n[output truncated]");
        }
        text
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_opts() -> ExecOptions {
        ExecOptions {
            timeout: Duration::from_secs(10),
            ..Default::default()
        }
    }

    #[test]
    fn spawn_failure_reports_sentinel_exit_code() {
        let outcome = execute("definitely-not-a-real-command-xyz", &[], &quick_opts());
        assert_eq!(outcome.exit_code, SPAWN_EXIT_CODE);
        assert!(!outcome.success());
        assert!(!outcome.timed_out);
        assert!(outcome.stderr.contains("failed to spawn"));
    }

    #[cfg(unix)]
    #[test]
    fn successful_command_has_zero_exit_code() {
        let outcome = execute("true", &[], &quick_opts());
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.success());
        assert!(!outcome.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_returns_outcome_not_error() {
        let outcome = execute("false", &[], &quick_opts());
        assert_eq!(outcome.exit_code, 1);
        assert!(!outcome.success());
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_captured() {
        let outcome = execute("echo", &["hello".to_string()], &quick_opts());
        assert!(outcome.success());
        assert!(outcome.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn stderr_and_exit_code_are_captured() {
        let args = vec!["-c".to_string(), "echo oops >&2; exit 3".to_string()];
        let outcome = execute("sh", &args, &quick_opts());
        assert_eq!(outcome.exit_code, 3);
        assert!(outcome.stderr.contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_the_child() {
        let opts = ExecOptions {
            timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let outcome = execute("sleep", &["5".to_string()], &opts);
        assert!(outcome.timed_out);
        assert_eq!(outcome.exit_code, TIMEOUT_EXIT_CODE);
        assert!(outcome.duration < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn cwd_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let opts = ExecOptions {
            cwd: Some(dir.path().to_path_buf()),
            timeout: Duration::from_secs(10),
            env: Vec::new(),
        };
        let outcome = execute("sh", &["-c".to_string(), "pwd".to_string()], &opts);
        assert!(outcome.success());
        let canonical = dir.path().canonicalize().unwrap();
        assert!(outcome.stdout.contains(&canonical.display().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn extra_env_is_passed_through() {
        let opts = ExecOptions {
            env: vec![("MAESTRO_TEST_VAR".to_string(), "42".to_string())],
            timeout: Duration::from_secs(10),
            ..Default::default()
        };
        let args = vec!["-c".to_string(), "echo $MAESTRO_TEST_VAR".to_string()];
        let outcome = execute("sh", &args, &opts);
        assert!(outcome.stdout.contains("42"));
    }

    #[test]
    fn failure_constructor_is_not_a_timeout() {
        let outcome = CommandOutcome::failure(1, "nope");
        assert!(!outcome.success());
        assert!(!outcome.timed_out);
        assert_eq!(outcome.stderr, "nope");
    }
}
