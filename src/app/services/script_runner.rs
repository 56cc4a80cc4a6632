//! Runs a script (optionally under `pdb`) as a child process and streams
//! its output back to the UI thread.
//!
//! Three helper threads are used per run: one reader per output pipe and a
//! waiter that polls the child and reports its exit. None of them touch
//! widgets; everything goes through a [`ProcessEventSink`].

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::app::infrastructure::error::{AppError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const READ_CHUNK: usize = 4096;
/// How long to wait for the output pipes to close once the child is gone.
/// A detached grandchild can keep them open indefinitely.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// Text from the child's stdout.
    Output(String),
    /// Text from the child's stderr.
    Error(String),
    /// The child exited. `exit_code` is -1 when it was killed by a signal.
    Finished { exit_code: i32, stopped: bool },
}

/// Destination for events produced on runner threads.
pub trait ProcessEventSink: Clone + Send + 'static {
    fn emit(&self, event: ProcessEvent);
}

impl ProcessEventSink for std::sync::mpsc::Sender<ProcessEvent> {
    fn emit(&self, event: ProcessEvent) {
        let _ = self.send(event);
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("a script is already running")]
    AlreadyRunning,

    #[error("File not found at '{0}'")]
    ScriptNotFound(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<RunError> for AppError {
    fn from(e: RunError) -> Self {
        AppError::Process(e.to_string())
    }
}

/// What to run: `<interpreter> [-m pdb] <script>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub interpreter: String,
    pub script: PathBuf,
    pub debug: bool,
}

impl RunRequest {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>, debug: bool) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            debug,
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(3);
        if self.debug {
            args.push("-m".to_string());
            args.push("pdb".to_string());
        }
        args.push(self.script.to_string_lossy().to_string());
        args
    }

    /// Human-readable command for the console banner.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.interpreter.clone()];
        parts.extend(self.args());
        parts.join(" ")
    }

    fn working_dir(&self) -> Option<&Path> {
        self.script.parent().filter(|p| !p.as_os_str().is_empty())
    }
}

struct RunningProcess {
    child: Arc<Mutex<Child>>,
    stdin: Option<ChildStdin>,
    stop_requested: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

/// Owns at most one child process at a time.
#[derive(Default)]
pub struct ScriptRunner {
    active: Option<RunningProcess>,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::SeqCst))
    }

    /// Spawn the child and its helper threads. Output and the final exit
    /// status arrive through `sink`.
    pub fn start<S: ProcessEventSink>(&mut self, request: &RunRequest, sink: S) -> std::result::Result<(), RunError> {
        if self.is_running() {
            return Err(RunError::AlreadyRunning);
        }
        if !request.script.is_file() {
            return Err(RunError::ScriptNotFound(request.script.display().to_string()));
        }

        let mut command = Command::new(&request.interpreter);
        command
            .args(request.args())
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = request.working_dir() {
            command.current_dir(dir);
        }
        // Own process group, so Stop reaches anything the script spawns.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            program: request.interpreter.clone(),
            source,
        })?;
        tracing::info!(pid = child.id(), command = %request.command_line(), "script started");

        let stdin = child.stdin.take();
        let readers: Vec<JoinHandle<()>> = [
            child.stdout.take().map(|out| spawn_stream_reader(out, sink.clone(), false)),
            child.stderr.take().map(|err| spawn_stream_reader(err, sink.clone(), true)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let child = Arc::new(Mutex::new(child));
        let stop_requested = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));

        spawn_waiter(
            child.clone(),
            readers,
            stop_requested.clone(),
            finished.clone(),
            sink,
        );

        self.active = Some(RunningProcess {
            child,
            stdin,
            stop_requested,
            finished,
        });
        Ok(())
    }

    /// Write one line to the child's stdin.
    pub fn send_input(&mut self, line: &str) -> Result<()> {
        if !self.is_running() {
            return Err(AppError::Process("no script is running".to_string()));
        }
        let stdin = self
            .active
            .as_mut()
            .and_then(|p| p.stdin.as_mut())
            .ok_or_else(|| AppError::Process("script input is closed".to_string()))?;
        stdin.write_all(line.as_bytes())?;
        stdin.write_all(b"\n")?;
        stdin.flush()?;
        Ok(())
    }

    /// Kill the running child. Returns false when nothing was running.
    /// The waiter thread still reports `Finished` with `stopped: true`.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(process) = self.active.as_mut() else {
            return false;
        };
        process.stop_requested.store(true, Ordering::SeqCst);
        process.stdin = None;
        match process.child.lock() {
            Ok(mut child) => {
                #[cfg(unix)]
                kill_process_group(child.id());
                if let Err(e) = child.kill() {
                    tracing::debug!(error = %e, "kill after group signal failed");
                }
            }
            Err(_) => tracing::error!("script process lock poisoned"),
        }
        true
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        tracing::debug!(pid, error = %e, "failed to signal script process group");
    }
}

impl Drop for ScriptRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_waiter<S: ProcessEventSink>(
    child: Arc<Mutex<Child>>,
    readers: Vec<JoinHandle<()>>,
    stop_requested: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    sink: S,
) {
    thread::spawn(move || {
        let exit_code = loop {
            let polled = match child.lock() {
                Ok(mut c) => c.try_wait(),
                Err(_) => break -1,
            };
            match polled {
                Ok(Some(status)) => break status.code().unwrap_or(-1),
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    tracing::error!(error = %e, "failed to poll script process");
                    break -1;
                }
            }
        };

        // Drain the pipes before announcing the exit so output stays ordered,
        // but never wait on a pipe held open by a process that outlived the child.
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while readers.iter().any(|r| !r.is_finished()) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        for reader in readers {
            if reader.is_finished() {
                let _ = reader.join();
            } else {
                tracing::debug!("output pipe still open after exit, detaching reader");
            }
        }

        let stopped = stop_requested.load(Ordering::SeqCst);
        tracing::info!(exit_code, stopped, "script finished");
        finished.store(true, Ordering::SeqCst);
        sink.emit(ProcessEvent::Finished { exit_code, stopped });
    });
}

fn spawn_stream_reader<R: Read + Send + 'static, S: ProcessEventSink>(
    mut pipe: R,
    sink: S,
    is_stderr: bool,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let wrap = |text: String| {
            if is_stderr {
                ProcessEvent::Error(text)
            } else {
                ProcessEvent::Output(text)
            }
        };
        let mut buf = [0u8; READ_CHUNK];
        let mut decoder = Utf8Accumulator::default();
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let text = decoder.push(&buf[..n]);
                    if !text.is_empty() {
                        sink.emit(wrap(text));
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, is_stderr, "pipe read failed");
                    break;
                }
            }
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            sink.emit(wrap(rest));
        }
    })
}

/// Decodes a byte stream that may split multi-byte characters across reads.
/// Incomplete trailing bytes are held until the next chunk; invalid bytes
/// become U+FFFD.
#[derive(Debug, Default)]
struct Utf8Accumulator {
    pending: Vec<u8>,
}

impl Utf8Accumulator {
    fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(n) => {
                            out.push('\u{FFFD}');
                            rest = &after[n..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        self.pending = rest.to_vec();
        out
    }

    fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }
}
