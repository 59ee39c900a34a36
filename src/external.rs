use crate::command::CommandGroup;
use crate::env::SearchPath;
use crate::error::ShellError;
use crate::parser::{Redirected, parse_redirection};
use nix::unistd::{AccessFlags, access};
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{debug, info};

/// Permission bits for a redirect destination the shell has to create.
const DESTINATION_MODE: u32 = 0o700;

/// A child process started for one command group.
///
/// Whoever holds the record is responsible for waiting on it.
#[derive(Debug)]
pub struct LaunchRecord {
    name: String,
    child: Child,
}

impl LaunchRecord {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the child terminates. Its exit status is discarded.
    pub fn wait(mut self) -> Result<(), ShellError> {
        let status = self
            .child
            .wait()
            .map_err(|e| ShellError::system(format!("wait for {}", self.name), e))?;
        debug!(pid = self.child.id(), command = %self.name, %status, "child finished");
        Ok(())
    }
}

/// Command that is not a builtin, resolved and ready to spawn.
#[derive(Debug)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<String>,
    stdout: Option<File>,
}

impl ExternalCommand {
    /// Turn a command group into something that can be spawned.
    ///
    /// Redirection is validated first, then the destination is opened
    /// (creating or truncating it), and only then is the name resolved. A
    /// destination is therefore truncated even if the command turns out not
    /// to exist.
    pub fn prepare(group: CommandGroup, search_path: &SearchPath) -> Result<Self, ShellError> {
        let Redirected { group, destination } = parse_redirection(group)?;
        let stdout = destination.as_deref().map(open_destination).transpose()?;

        let name = group
            .name()
            .ok_or_else(|| ShellError::Resolution(String::new()))?;
        let program = find_command_path(name, search_path)
            .ok_or_else(|| ShellError::Resolution(name.to_string()))?;

        Ok(Self {
            program,
            args: group.into_args(),
            stdout,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument vector handed to the child, command name first.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn redirects_stdout(&self) -> bool {
        self.stdout.is_some()
    }

    /// Start the child without waiting for it.
    ///
    /// The child sees the command name as typed in `argv[0]`, not the
    /// resolved path.
    pub fn spawn(self) -> Result<LaunchRecord, ShellError> {
        let ExternalCommand {
            program,
            args,
            stdout,
        } = self;
        let Some((name, rest)) = args.split_first() else {
            return Err(ShellError::Resolution(String::new()));
        };

        let mut cmd = Command::new(&program);
        cmd.arg0(name).args(rest);
        if let Some(file) = stdout {
            cmd.stdout(Stdio::from(file));
        }

        let child = cmd
            .spawn()
            .map_err(|e| ShellError::system(format!("spawn {}", program.display()), e))?;
        info!(pid = child.id(), program = %program.display(), "launched");
        Ok(LaunchRecord {
            name: name.clone(),
            child,
        })
    }
}

/// Prepare and spawn one command group.
pub fn launch(group: CommandGroup, search_path: &SearchPath) -> Result<LaunchRecord, ShellError> {
    ExternalCommand::prepare(group, search_path)?.spawn()
}

/// Find `name` in the search path.
///
/// Each directory is tried in order as `dir + "/" + name`; the first
/// executable candidate wins. An empty search path resolves nothing.
pub fn find_command_path(name: &str, search_path: &SearchPath) -> Option<PathBuf> {
    for dir in search_path.iter() {
        let candidate = PathBuf::from(format!("{}/{}", dir, name));
        if is_executable(&candidate) {
            debug!(command = name, path = %candidate.display(), "resolved");
            return Some(candidate);
        }
    }
    debug!(command = name, "not found in search path");
    None
}

/// Regular file (after following symlinks) that this process may execute.
fn is_executable(path: &Path) -> bool {
    let is_file = fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false);
    is_file && access(path, AccessFlags::X_OK).is_ok()
}

fn open_destination(destination: &str) -> Result<File, ShellError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(DESTINATION_MODE)
        .open(destination)
        .map_err(|e| ShellError::system(format!("open {}", destination), e))
}
