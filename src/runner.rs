//! External process invocation.
//! Feeds script text to the transformation tool on stdin and collects its
//! stdout.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use log::debug;

use crate::config::TransformCommand;
use crate::error::{Error, Result};

/// Runs a transformation command: text in, text out.
pub trait ProcessRunner {
    /// Writes `input` to the command's stdin, closes it, waits for the
    /// process to exit and returns its complete stdout.
    ///
    /// # Errors
    /// * `Error::ExternalToolError` if the process cannot be started, exits
    ///   non-zero, stops reading its input early, or produces empty or
    ///   non-UTF-8 output
    fn run(&self, command: &TransformCommand, input: &str) -> Result<String>;
}

/// Runs the command as a child process with piped standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn tool_error(command: &TransformCommand, diagnostic: impl Into<String>) -> Error {
    Error::ExternalToolError {
        command: command.to_string(),
        diagnostic: diagnostic.into(),
    }
}

impl ProcessRunner for SubprocessRunner {
    fn run(&self, command: &TransformCommand, input: &str) -> Result<String> {
        debug!("Running `{}` on {} bytes of input", command, input.len());

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| tool_error(command, e.to_string()))?;

        // stdout must be drained while stdin is still being written.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| tool_error(command, e.to_string()))?;

        let write_result = match writer {
            Some(handle) => handle
                .join()
                .map_err(|_| tool_error(command, "stdin writer panicked"))?,
            None => Ok(()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let diagnostic = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(tool_error(command, format!("{}: {}", output.status, diagnostic)));
        }

        // Output produced from a truncated input is never accepted.
        if let Err(e) = write_result {
            return Err(tool_error(command, format!("tool did not consume its input: {e}")));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| tool_error(command, format!("output is not valid UTF-8: {e}")))?;
        if stdout.trim().is_empty() {
            return Err(tool_error(command, "produced no output"));
        }

        debug!("`{}` produced {} bytes", command, stdout.len());
        Ok(stdout)
    }
}
