use argh::FromArgs;
use rush::error::report;
use rush::io_adapters::{EditorInput, LineSource, PlainInput};
use rush::{Interpreter, ShellConfig, logging};
use std::io::{self, IsTerminal};
use std::process;
use tracing::error;

#[derive(FromArgs)]
/// Interactive shell. Takes no arguments.
struct Cli {}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let rest: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
    if Cli::from_args(&["rush"], &rest).is_err() {
        report(&mut io::stderr());
        process::exit(1);
    }

    if let Err(err) = logging::init_logging() {
        eprintln!("{:#}", err);
    }

    let mut input: Box<dyn LineSource> = if io::stdin().is_terminal() {
        match EditorInput::new() {
            Ok(editor) => Box::new(editor),
            Err(err) => {
                error!(error = %err, "falling back to plain input");
                Box::new(PlainInput::new(io::stdin().lock(), io::stdout()))
            }
        }
    } else {
        Box::new(PlainInput::new(io::stdin().lock(), io::stdout()))
    };

    let mut shell = Interpreter::new(ShellConfig::default());
    if let Err(err) = shell.repl(input.as_mut()) {
        error!(error = %err, "read loop failed");
        report(&mut io::stderr());
        process::exit(1);
    }
}
