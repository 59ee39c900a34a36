use crate::builtin::{self, Cd, Exit};
use crate::command::{Batch, CommandGroup, CommandKind, Flow};
use crate::config::ShellConfig;
use crate::env::SearchPath;
use crate::error;
use crate::external::{self, LaunchRecord};
use crate::io_adapters::LineSource;
use crate::lexer::split_into_batch;
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// The shell: reads lines, runs built-ins in-process, and fans external
/// commands out as parallel child processes.
///
/// The interpreter owns the [`SearchPath`]; it lends it to the launcher for
/// every command and only changes it through the `path` built-in, between
/// batches.
///
/// Example
/// ```no_run
/// use rush::{Flow, Interpreter, ShellConfig};
/// let mut sh = Interpreter::new(ShellConfig::default());
/// assert_eq!(sh.execute_line("ls -l & echo done"), Flow::Continue);
/// assert_eq!(sh.execute_line("exit"), Flow::Exit);
/// ```
pub struct Interpreter {
    config: ShellConfig,
    search_path: SearchPath,
}

impl Interpreter {
    pub fn new(config: ShellConfig) -> Self {
        let search_path = config.search_path();
        Self {
            config,
            search_path,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Read-Eval loop. Returns once `exit` runs or the input is exhausted.
    pub fn repl(&mut self, input: &mut dyn LineSource) -> anyhow::Result<()> {
        self.repl_with_diagnostics(input, &mut io::stderr())
    }

    pub fn repl_with_diagnostics(
        &mut self,
        input: &mut dyn LineSource,
        diag: &mut dyn Write,
    ) -> anyhow::Result<()> {
        info!(path = ?self.search_path.dirs(), "shell started");
        loop {
            let Some(line) = input.read_line(&self.config.prompt)? else {
                info!("end of input");
                break;
            };
            if self.execute_line_with_diagnostics(&line, diag) == Flow::Exit {
                break;
            }
        }
        info!("shutting down");
        Ok(())
    }

    /// Handle one input line, reporting failures on standard error.
    pub fn execute_line(&mut self, line: &str) -> Flow {
        self.execute_line_with_diagnostics(line, &mut io::stderr())
    }

    /// Handle one input line, reporting failures to `diag`.
    ///
    /// Only the first group decides between built-in and external dispatch.
    /// When it names a built-in, the remaining groups are ignored.
    pub fn execute_line_with_diagnostics(&mut self, line: &str, diag: &mut dyn Write) -> Flow {
        let batch = split_into_batch(line);
        let Some(kind) = batch
            .first()
            .and_then(CommandGroup::name)
            .map(CommandKind::of)
        else {
            return Flow::Continue;
        };

        if kind.is_builtin() && batch.len() > 1 {
            debug!(ignored = batch.len() - 1, "groups after a builtin are not run");
        }

        let result = match kind {
            CommandKind::External => {
                self.run_batch(batch, diag);
                return Flow::Continue;
            }
            CommandKind::Exit => builtin::run::<Exit>(&batch.groups()[0], &mut self.search_path),
            CommandKind::Cd => builtin::run::<Cd>(&batch.groups()[0], &mut self.search_path),
            CommandKind::Path => {
                builtin::run::<builtin::Path>(&batch.groups()[0], &mut self.search_path)
            }
        };

        match result {
            Ok(flow) => flow,
            Err(err) => {
                debug!(error = %err, "builtin failed");
                error::report(diag);
                Flow::Continue
            }
        }
    }

    /// Launch every group of `batch` without waiting in between, then wait for
    /// all of them. Returns how many children were started.
    ///
    /// A group that fails to launch is reported and skipped; its siblings
    /// still run.
    pub fn run_batch(&self, batch: Batch, diag: &mut dyn Write) -> usize {
        let mut wait_set: Vec<LaunchRecord> = Vec::with_capacity(batch.len());
        for group in batch.into_groups() {
            match external::launch(group, &self.search_path) {
                Ok(record) => wait_set.push(record),
                Err(err) => {
                    debug!(error = %err, "launch failed");
                    error::report(diag);
                }
            }
        }

        let launched = wait_set.len();
        debug!(launched, "waiting for batch");
        for record in wait_set {
            if let Err(err) = record.wait() {
                warn!(error = %err, "lost track of child");
            }
        }
        launched
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::lock_current_dir;
    use crate::error::ERROR_MESSAGE;
    use crate::io_adapters::PlainInput;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn shell() -> Interpreter {
        Interpreter::new(ShellConfig::default().with_initial_path(["/bin", "/usr/bin"]))
    }

    /// Runs `line` and returns the flow plus how many diagnostics were printed.
    fn run(sh: &mut Interpreter, line: &str) -> (Flow, usize) {
        let mut diag = Vec::new();
        let flow = sh.execute_line_with_diagnostics(line, &mut diag);
        let text = String::from_utf8(diag).unwrap();
        assert_eq!(
            text.len() % ERROR_MESSAGE.len(),
            0,
            "unexpected stderr {:?}",
            text
        );
        (flow, text.matches(ERROR_MESSAGE).count())
    }

    fn echo_into(out: &Path, words: &str) -> String {
        format!("echo {} > {}", words, out.display())
    }

    #[test]
    fn test_blank_lines_do_nothing() {
        let mut sh = shell();
        for line in ["", "   ", "\t\n", " & ", "&"] {
            assert_eq!(run(&mut sh, line), (Flow::Continue, 0), "line {:?}", line);
        }
    }

    #[test]
    fn test_exit() {
        let mut sh = shell();
        assert_eq!(run(&mut sh, "exit extra"), (Flow::Continue, 1));
        assert_eq!(run(&mut sh, "  exit  "), (Flow::Exit, 0));
    }

    #[test]
    fn test_cd_failures_keep_working_directory() {
        let _lock = lock_current_dir();
        let before = std::env::current_dir().unwrap();
        let mut sh = shell();

        assert_eq!(run(&mut sh, "cd"), (Flow::Continue, 1));
        assert_eq!(run(&mut sh, "cd a b"), (Flow::Continue, 1));
        assert_eq!(
            run(&mut sh, "cd /definitely/not/a/dir/for/rush"),
            (Flow::Continue, 1)
        );
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_builtin_arguments_are_never_flags() {
        let mut sh = shell();
        assert_eq!(run(&mut sh, "path -x /bin"), (Flow::Continue, 0));
        assert_eq!(sh.search_path().dirs(), ["-x", "/bin"]);
        assert_eq!(run(&mut sh, "path --help"), (Flow::Continue, 0));
        assert_eq!(sh.search_path().dirs(), ["--help"]);
        assert_eq!(run(&mut sh, "exit --help"), (Flow::Continue, 1));
    }

    #[test]
    fn test_external_command_with_redirection() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let mut sh = shell();

        assert_eq!(
            run(&mut sh, &echo_into(&out, "hello  world")),
            (Flow::Continue, 0)
        );
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
    }

    #[test]
    fn test_redirection_errors_are_reported() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let out = out.display();
        let mut sh = shell();

        for line in [
            "echo > ".to_string(),
            format!("echo > {} extra", out),
            format!("> {}", out),
            format!("echo > {} > {}", out, out),
            format!("echo >> {}", out),
        ] {
            assert_eq!(run(&mut sh, &line), (Flow::Continue, 1), "line {:?}", line);
        }
    }

    #[test]
    fn test_path_controls_resolution() {
        let bin = TempDir::new().unwrap();
        std::os::unix::fs::symlink("/bin/echo", bin.path().join("echo")).unwrap();
        let work = TempDir::new().unwrap();
        let out = work.path().join("out");
        let mut sh = shell();

        assert_eq!(run(&mut sh, "path"), (Flow::Continue, 0));
        assert!(sh.search_path().is_empty());
        assert_eq!(
            run(&mut sh, &echo_into(&out, "unreachable")),
            (Flow::Continue, 1)
        );

        let line = format!("path /nonexistent/rush/dir {}", bin.path().display());
        assert_eq!(run(&mut sh, &line), (Flow::Continue, 0));
        assert_eq!(
            run(&mut sh, &echo_into(&out, "found")),
            (Flow::Continue, 0)
        );
        assert_eq!(fs::read_to_string(&out).unwrap(), "found\n");
    }

    #[test]
    fn test_failed_launch_does_not_stop_siblings() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let mut sh = shell();

        let line = format!(
            "no-such-command-for-rush & {} & echo x > & {}",
            echo_into(&a, "first"),
            echo_into(&b, "second")
        );
        assert_eq!(run(&mut sh, &line), (Flow::Continue, 2));
        assert_eq!(fs::read_to_string(&a).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(&b).unwrap(), "second\n");
    }

    #[test]
    fn test_run_batch_counts_launches() {
        let sh = shell();
        let mut diag = Vec::new();
        let batch = split_into_batch("true & nope-for-rush & true &");
        let launched = sh.run_batch(batch, &mut diag);
        assert_eq!(launched, 2);
        assert_eq!(diag, ERROR_MESSAGE.as_bytes());
    }

    #[test]
    fn test_batch_runs_in_parallel() {
        let mut sh = shell();
        let started = Instant::now();
        assert_eq!(
            run(&mut sh, "sleep 1 & sleep 1 & sleep 1"),
            (Flow::Continue, 0)
        );
        let elapsed = started.elapsed();

        assert!(
            elapsed >= Duration::from_secs(1),
            "returned before children finished"
        );
        assert!(
            elapsed < Duration::from_millis(2500),
            "children ran one after another: {:?}",
            elapsed
        );
    }

    #[test]
    fn test_builtin_first_ignores_other_groups() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let mut sh = shell();

        let line = format!("path /bin & {}", echo_into(&out, "skipped"));
        assert_eq!(run(&mut sh, &line), (Flow::Continue, 0));
        assert_eq!(sh.search_path().dirs(), ["/bin"]);
        assert!(!out.exists());
    }

    #[test]
    fn test_repl_stops_at_exit() {
        let dir = TempDir::new().unwrap();
        let before = dir.path().join("before");
        let after = dir.path().join("after");
        let script = format!(
            "\n{}\nexit now\nexit\n{}\n",
            echo_into(&before, "ran"),
            echo_into(&after, "never")
        );

        let mut prompts = Vec::new();
        let mut diag = Vec::new();
        let mut input = PlainInput::new(Cursor::new(script.into_bytes()), &mut prompts);
        shell().repl_with_diagnostics(&mut input, &mut diag).unwrap();
        drop(input);

        assert_eq!(String::from_utf8(prompts).unwrap(), "rush> ".repeat(4));
        assert_eq!(diag, ERROR_MESSAGE.as_bytes());
        assert_eq!(fs::read_to_string(&before).unwrap(), "ran\n");
        assert!(!after.exists());
    }

    #[test]
    fn test_repl_stops_at_end_of_input() {
        let reader = Cursor::new(b"path /usr/bin".to_vec());
        let mut input = PlainInput::new(reader, Vec::new());
        let mut sh = shell();
        sh.repl_with_diagnostics(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(sh.search_path().dirs(), ["/usr/bin"]);
    }
}
