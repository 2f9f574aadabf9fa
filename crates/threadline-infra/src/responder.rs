//! BashResponder -- runs interactive "run" scripts through `/bin/bash`.
//!
//! The script is written to the shell's stdin behind an `exec 2>&1`, so
//! stdout and stderr share one pipe and keep their relative order. There is
//! no sandboxing: the script runs with the server's privileges.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use threadline_core::responder::{CommandOutput, CommandResponder};
use threadline_types::error::ResponderError;

const MERGE_STDERR: &[u8] = b"exec 2>&1\n";

pub struct BashResponder {
    shell: PathBuf,
}

impl BashResponder {
    pub fn new() -> Self {
        Self::with_shell("/bin/bash")
    }

    pub fn with_shell(shell: impl Into<PathBuf>) -> Self {
        Self { shell: shell.into() }
    }
}

impl Default for BashResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandResponder for BashResponder {
    async fn handle(&self, script: &str) -> Result<CommandOutput, ResponderError> {
        let mut child = Command::new(&self.shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ResponderError::Spawn(format!("{}: {e}", self.shell.display())))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(MERGE_STDERR)
                .await
                .map_err(|e| ResponderError::Io(e.to_string()))?;
            stdin
                .write_all(script.as_bytes())
                .await
                .map_err(|e| ResponderError::Io(e.to_string()))?;
            // Dropping stdin closes the pipe so the shell sees EOF.
        }

        let out = child
            .wait_with_output()
            .await
            .map_err(|e| ResponderError::Io(e.to_string()))?;

        // Anything the shell wrote before the redirect took effect.
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        tracing::debug!(exit_code = ?out.status.code(), "script finished");
        Ok(CommandOutput {
            output,
            exit_code: out.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = BashResponder::new().handle("echo hi").await.unwrap();
        assert_eq!(out.output, "hi\n");
        assert!(out.success());
        assert_eq!(out.exit_status(), "");
    }

    #[tokio::test]
    async fn test_nonzero_exit_keeps_output() {
        let out = BashResponder::new()
            .handle("echo oops >&2\nexit 3")
            .await
            .unwrap();
        assert_eq!(out.output, "oops\n");
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.exit_status(), "exit status 3");
    }

    #[tokio::test]
    async fn test_stdout_and_stderr_interleave() {
        let out = BashResponder::new()
            .handle("echo one\necho two >&2\necho three")
            .await
            .unwrap();
        assert_eq!(out.output, "one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn test_missing_shell_is_spawn_error() {
        let err = BashResponder::with_shell("/nonexistent/shell")
            .handle("true")
            .await
            .unwrap_err();
        assert!(matches!(err, ResponderError::Spawn(_)));
    }
}
