//! Command-responder collaborator: runs the script behind a "run" button.

use std::future::Future;
use std::pin::Pin;

use threadline_types::error::ResponderError;

/// Result of running a script to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout and stderr, in the order they were written.
    pub output: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// `"exit status N"` for a failed run, empty on success.
    pub fn exit_status(&self) -> String {
        match self.exit_code {
            Some(0) => String::new(),
            Some(code) => format!("exit status {code}"),
            None => "signal: killed".to_string(),
        }
    }
}

/// Executes a text payload and reports its output.
///
/// A script that runs and exits non-zero is a successful call; only failing
/// to run it at all is an error. Implementations live in threadline-infra
/// (`BashResponder`).
pub trait CommandResponder: Send + Sync {
    fn handle(
        &self,
        script: &str,
    ) -> impl std::future::Future<Output = Result<CommandOutput, ResponderError>> + Send;
}

type HandleFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandOutput, ResponderError>> + Send + 'a>>;

/// Object-safe version of [`CommandResponder`].
pub trait CommandResponderDyn: Send + Sync {
    fn handle_boxed<'a>(&'a self, script: &'a str) -> HandleFuture<'a>;
}

impl<T: CommandResponder> CommandResponderDyn for T {
    fn handle_boxed<'a>(&'a self, script: &'a str) -> HandleFuture<'a> {
        Box::pin(self.handle(script))
    }
}

/// Type-erased command responder.
pub struct BoxCommandResponder {
    inner: Box<dyn CommandResponderDyn + Send + Sync>,
}

impl BoxCommandResponder {
    pub fn new<T: CommandResponder + 'static>(responder: T) -> Self {
        Self {
            inner: Box::new(responder),
        }
    }

    pub async fn handle(&self, script: &str) -> Result<CommandOutput, ResponderError> {
        self.inner.handle_boxed(script).await
    }
}
