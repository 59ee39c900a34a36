use crate::command::{CommandGroup, Flow};
use crate::env::SearchPath;
use crate::error::ShellError;
use argh::{EarlyExit, FromArgs};
use std::env;
use tracing::{debug, info};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in the shell process. Any argument-count mismatch surfaces as a parse failure
/// and is turned into [`ShellError::Usage`].
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "exit" or "cd".
    fn name() -> &'static str;

    /// Executes the command against the shell state.
    fn execute(self, search_path: &mut SearchPath) -> Result<Flow, ShellError>;
}

/// Parse `group` as builtin `T` and run it.
///
/// Arguments are always positional: `-x`, `--help` or `help` are passed on
/// as directory names, never read as flags.
pub(crate) fn run<T: BuiltinCommand>(
    group: &CommandGroup,
    search_path: &mut SearchPath,
) -> Result<Flow, ShellError> {
    let args: Vec<&str> = std::iter::once("--")
        .chain(group.args().iter().skip(1).map(String::as_str))
        .collect();
    let cmd = T::from_args(&[T::name()], &args).map_err(|EarlyExit { output, .. }| {
        ShellError::Usage(format!("{}: {}", T::name(), output.trim_end()))
    })?;
    debug!(builtin = T::name(), args = args.len() - 1, "running builtin");
    cmd.execute(search_path)
}

#[derive(FromArgs, Debug, PartialEq)]
/// Leave the shell. Takes no arguments.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _search_path: &mut SearchPath) -> Result<Flow, ShellError> {
        Ok(Flow::Exit)
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _search_path: &mut SearchPath) -> Result<Flow, ShellError> {
        env::set_current_dir(&self.target)
            .map_err(|e| ShellError::system(format!("cd {}", self.target), e))?;
        info!(dir = %self.target, "changed directory");
        Ok(Flow::Continue)
    }
}

#[derive(FromArgs, Debug, PartialEq)]
/// Replace the command search path with the given directories.
pub struct Path {
    #[argh(positional, greedy)]
    /// directories to search, in order; none at all disables external commands.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for Path {
    fn name() -> &'static str {
        "path"
    }

    fn execute(self, search_path: &mut SearchPath) -> Result<Flow, ShellError> {
        info!(dirs = ?self.dirs, "replacing search path");
        search_path.replace(self.dirs);
        Ok(Flow::Continue)
    }
}

/// Serialises tests that touch the process-wide working directory.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
