//! Error taxonomy of the shell.
//!
//! Every variant is recoverable at the call site that observed it. What the
//! user sees is always the same fixed line, [`ERROR_MESSAGE`]; the `Display`
//! text of [`ShellError`] only ever reaches the logs.

use std::io::{self, Write};
use thiserror::Error;

/// The one diagnostic the shell prints, whatever went wrong.
pub const ERROR_MESSAGE: &str = "An error has occurred\n";

/// Why a redirection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectionFault {
    /// The operator is the first token, so there is nothing to redirect.
    MissingCommand,
    /// More than one `>` character appears across the group.
    MultipleOperators,
    /// A `>` appears, but only glued to other characters (`a>b`).
    DetachedOperator,
    /// Nothing follows the operator.
    MissingTarget,
    /// More than one token follows the operator.
    ExtraTargets,
}

impl std::fmt::Display for RedirectionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RedirectionFault::MissingCommand => "no command before '>'",
            RedirectionFault::MultipleOperators => "more than one '>'",
            RedirectionFault::DetachedOperator => "'>' is not a separate word",
            RedirectionFault::MissingTarget => "no file after '>'",
            RedirectionFault::ExtraTargets => "more than one file after '>'",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    /// Wrong argument count for a built-in, or arguments given to the shell itself.
    #[error("usage: {0}")]
    Usage(String),

    /// The command name matched nothing in the search path.
    #[error("command not found: {0}")]
    Resolution(String),

    #[error("invalid redirection: {0}")]
    Redirection(RedirectionFault),

    /// An OS primitive (spawn, open, chdir, wait) failed.
    #[error("{context}: {source}")]
    System {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ShellError {
    pub fn system(context: impl Into<String>, source: io::Error) -> Self {
        ShellError::System {
            context: context.into(),
            source,
        }
    }
}

/// Write the uniform diagnostic to `diag`.
///
/// Failing to report is not itself reported.
pub fn report(diag: &mut dyn Write) {
    let _ = diag.write_all(ERROR_MESSAGE.as_bytes());
    let _ = diag.flush();
}
