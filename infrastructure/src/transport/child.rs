//! Transport to a tool host running as a child process.
//!
//! The host speaks the protocol on its stdout/stdin; its stderr is inherited
//! so host logs show up in the client's terminal. The child is killed when
//! the transport is closed or dropped, and on Linux the kernel is asked to
//! SIGTERM it if this process dies first.

use super::Transport;
use super::error::TransportError;
use super::framed::FramedTransport;
use super::framing::Framing;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

/// How long `close()` waits for the child to exit after stdin is closed
/// before killing it.
const GRACEFUL_EXIT_TIMEOUT: Duration = Duration::from_millis(500);

/// Transport backed by a spawned host process
pub struct ChildProcessTransport {
    inner: FramedTransport<ChildStdout, ChildStdin>,
    child: Child,
    command: String,
}

impl ChildProcessTransport {
    /// Spawn `command args...` with piped stdio.
    pub fn spawn(
        command: &str,
        args: &[String],
        env: &[(String, String)],
        framing: Framing,
        max_frame_size: usize,
    ) -> Result<Self, TransportError> {
        debug!("Spawning tool host: {} {}", command, args.join(" "));

        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|source| TransportError::Spawn {
            command: command.to_string(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| TransportError::Spawn {
            command: command.to_string(),
            source: std::io::Error::other("failed to capture stdout"),
        })?;
        let stdin = child.stdin.take().ok_or_else(|| TransportError::Spawn {
            command: command.to_string(),
            source: std::io::Error::other("failed to capture stdin"),
        })?;

        let label = match child.id() {
            Some(pid) => format!("{} (pid {})", command, pid),
            None => command.to_string(),
        };

        Ok(Self {
            inner: FramedTransport::new(stdout, stdin, framing)
                .with_max_frame_size(max_frame_size)
                .with_label(label),
            child,
            command: command.to_string(),
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }
}

#[async_trait]
impl Transport for ChildProcessTransport {
    async fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.inner.send(frame).await
    }

    async fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.inner.receive().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // Closing stdin lets a well-behaved host exit on its own
        if let Err(e) = self.inner.close().await {
            debug!("Closing stdin of '{}' failed: {}", self.command, e);
        }

        match tokio::time::timeout(GRACEFUL_EXIT_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Tool host '{}' exited: {}", self.command, status);
            }
            Ok(Err(e)) => {
                warn!("Waiting for tool host '{}' failed: {}", self.command, e);
            }
            Err(_) => {
                debug!("Tool host '{}' still running, killing", self.command);
                self.child.start_kill()?;
                let _ = self.child.wait().await;
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

impl Drop for ChildProcessTransport {
    fn drop(&mut self) {
        debug!("ChildProcessTransport dropping, killing '{}'", self.command);
        let _ = self.child.start_kill();
    }
}
