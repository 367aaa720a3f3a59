//! Process-backed byte channel wrapping a JTAG debug terminal.
//!
//! Spawns `nios2-terminal` (or a compatible executable) and treats its
//! stdin as the channel's write end and its stdout as the read end.
//! stderr is discarded; the terminal's own chatter would otherwise leak
//! into the console.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::channel::{ByteChannel, ChannelControl, ChannelParts, ChannelReader, ChannelWriter};
use crate::error::ChannelError;

/// How the debug terminal is launched.
#[derive(Debug, Clone)]
pub struct TerminalConfig {
    /// Path to the terminal executable.
    pub program: PathBuf,

    /// JTAG UART instance to attach to.
    pub instance: u32,
}

/// Byte channel backed by a spawned debug-terminal subprocess.
pub struct TerminalChannel {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl TerminalChannel {
    /// Spawn the terminal process and wire up its streams.
    ///
    /// A missing executable surfaces as [`ChannelError::Unavailable`];
    /// the caller reports it, no retry is attempted.
    pub fn open(config: &TerminalConfig) -> Result<Self, ChannelError> {
        let mut cmd = Command::new(&config.program);
        cmd.arg("--no-quit-on-ctrl-c");
        cmd.arg(format!("--instance={}", config.instance));

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::null());
        cmd.kill_on_drop(true);

        tracing::debug!("spawning debug terminal: {}", config.program.display());

        let mut child = cmd
            .spawn()
            .map_err(|source| ChannelError::Unavailable { source })?;

        let stdin = child.stdin.take().ok_or_else(|| ChannelError::Unavailable {
            source: io::Error::other("child stdin not captured"),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| ChannelError::Unavailable {
            source: io::Error::other("child stdout not captured"),
        })?;

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }
}

impl ByteChannel for TerminalChannel {
    fn into_parts(self: Box<Self>) -> ChannelParts {
        ChannelParts {
            reader: Box::new(TerminalReader {
                stdout: self.stdout,
            }),
            writer: Box::new(TerminalWriter { stdin: self.stdin }),
            control: Box::new(TerminalControl {
                child: self.child,
                terminated: false,
            }),
        }
    }
}

struct TerminalReader {
    stdout: ChildStdout,
}

#[async_trait]
impl ChannelReader for TerminalReader {
    async fn read_one(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.stdout.read(&mut buf).await? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

struct TerminalWriter {
    stdin: ChildStdin,
}

#[async_trait]
impl ChannelWriter for TerminalWriter {
    async fn write_one(&mut self, byte: u8) -> io::Result<()> {
        self.stdin.write_all(&[byte]).await?;
        self.stdin.flush().await
    }
}

struct TerminalControl {
    child: Child,
    terminated: bool,
}

#[async_trait]
impl ChannelControl for TerminalControl {
    async fn terminate(&mut self) -> io::Result<()> {
        if self.terminated {
            return Ok(());
        }
        self.terminated = true;

        // start_kill fails if the process already exited; either way the
        // wait below reaps it.
        if let Err(e) = self.child.start_kill() {
            tracing::debug!("debug terminal already gone: {}", e);
        }
        let status = self.child.wait().await?;
        tracing::debug!("debug terminal exited: {}", status);
        Ok(())
    }
}
