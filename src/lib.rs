//! `rush`: a small interactive command shell.
//!
//! A line is split into command groups separated by `&`. Every group is
//! resolved against a search path and launched as its own child process,
//! optionally with standard output redirected to a file (`cmd args > file`).
//! The shell waits for the whole batch before prompting again. Three built-ins
//! run in-process: `exit`, `cd <dir>` and `path [dir ...]`.
//!
//! The main entry point is [`Interpreter`]. The [`lexer`], [`parser`] and
//! [`external`] modules expose the tokenizer, the redirection rules and the
//! resolver/launcher on their own.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
pub mod io_adapters;
mod interpreter;
pub mod lexer;
pub mod logging;
pub mod parser;

pub use command::{Batch, CommandGroup, CommandKind, Flow};
pub use config::ShellConfig;
pub use env::SearchPath;
pub use error::ShellError;
pub use interpreter::Interpreter;
