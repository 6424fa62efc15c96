//! Child process execution for the packaging and signing tools.
//!
//! Every external tool call goes through here so output handling and error
//! reporting are uniform. The output of the child is either inherited (when we
//! are attached to a terminal) or relayed line by line into the log.

use crate::bundler::error::{Error, Result};
use std::io::IsTerminal;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// How a child process's stdout/stderr are handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Child writes straight to our stdout/stderr.
    Inherit,
    /// Both streams are drained concurrently and logged line by line.
    Relay,
}

impl OutputMode {
    /// Inherit when stdout is a terminal, relay otherwise.
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Inherit
        } else {
            Self::Relay
        }
    }
}

/// Output captured from a child process whose stdout is consumed by us.
#[derive(Debug, Default)]
pub struct CapturedOutput {
    /// Exit code, or -1 when terminated by a signal.
    pub code: i32,
    /// Lines written to stdout.
    pub stdout: Vec<String>,
    /// Lines written to stderr.
    pub stderr: Vec<String>,
}

impl CapturedOutput {
    /// Returns true for a zero exit code.
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Flags whose following argument is a secret (jarsigner and packager spelling).
const SECRET_FLAGS: [&str; 2] = ["-storepass", "-keypass"];

/// Placeholder for masked secrets.
const REDACTED: &str = "****";

/// Renders a command line for logs and error messages.
///
/// Keystore and key passwords are masked.
pub fn display_command(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    let mut parts = vec![std_cmd.get_program().to_string_lossy().into_owned()];
    let mut secret_next = false;
    for arg in std_cmd.get_args() {
        let arg = arg.to_string_lossy();
        if secret_next {
            parts.push(REDACTED.to_string());
            secret_next = false;
            continue;
        }
        secret_next = SECRET_FLAGS.iter().any(|flag| arg.eq_ignore_ascii_case(flag));
        parts.push(arg.into_owned());
    }
    parts.join(" ")
}

/// Feeds every line of `reader` to `on_line`, without line terminators.
///
/// Invalid UTF-8 is replaced instead of ending the stream.
async fn for_each_line<R>(reader: R, mut on_line: impl FnMut(String))
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer);
                on_line(line.trim_end_matches(['\n', '\r']).to_string());
            }
            Err(e) => {
                log::debug!("Stopped reading child output: {e}");
                break;
            }
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

/// Runs a command to completion, failing on a non-zero exit code.
pub async fn run(mut cmd: Command, mode: OutputMode) -> Result<()> {
    let command = display_command(&cmd);
    log::debug!("Running {command}");

    let status = match mode {
        OutputMode::Inherit => cmd
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|error| Error::CommandFailed {
                command: command.clone(),
                error,
            })?,
        OutputMode::Relay => {
            let mut child = cmd
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|error| Error::CommandFailed {
                    command: command.clone(),
                    error,
                })?;

            // Both streams must be drained before waiting, or a chatty child blocks.
            tokio::join!(
                async {
                    if let Some(stdout) = child.stdout.take() {
                        for_each_line(stdout, |line| log::info!("{line}")).await;
                    }
                },
                async {
                    if let Some(stderr) = child.stderr.take() {
                        for_each_line(stderr, |line| log::info!("{line}")).await;
                    }
                }
            );

            child.wait().await.map_err(|error| Error::CommandFailed {
                command: command.clone(),
                error,
            })?
        }
    };

    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandExit {
            command,
            code: exit_code(status),
        })
    }
}

/// Runs a command, feeding `stdin` and capturing both output streams.
///
/// Unlike [`run`], a non-zero exit is not an error; callers interpret the code.
pub async fn capture(mut cmd: Command, stdin: Option<Vec<u8>>) -> Result<CapturedOutput> {
    let command = display_command(&cmd);
    log::debug!("Running {command}");

    let mut child = cmd
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| Error::CommandFailed {
            command: command.clone(),
            error,
        })?;

    let mut input = child.stdin.take();
    let (write_result, stdout, stderr) = tokio::join!(
        async {
            match (input.as_mut(), stdin) {
                (Some(pipe), Some(bytes)) => {
                    let written = pipe.write_all(&bytes).await;
                    // Close stdin so the child sees EOF.
                    drop(input.take());
                    written
                }
                _ => Ok(()),
            }
        },
        async {
            let mut captured = Vec::new();
            if let Some(stdout) = child.stdout.take() {
                for_each_line(stdout, |line| captured.push(line)).await;
            }
            captured
        },
        async {
            let mut captured = Vec::new();
            if let Some(stderr) = child.stderr.take() {
                for_each_line(stderr, |line| {
                    log::debug!("{line}");
                    captured.push(line);
                })
                .await;
            }
            captured
        }
    );

    // A child that exits without reading its input closes the pipe early.
    if let Err(e) = write_result
        && e.kind() != std::io::ErrorKind::BrokenPipe
    {
        return Err(Error::CommandFailed { command, error: e });
    }

    let status = child.wait().await.map_err(|error| Error::CommandFailed {
        command: command.clone(),
        error,
    })?;

    Ok(CapturedOutput {
        code: exit_code(status),
        stdout,
        stderr,
    })
}
