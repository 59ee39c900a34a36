use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};
use tracing::warn;

/// Where the read loop gets its lines from.
pub trait LineSource {
    /// Show `prompt` and read one line. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive line editor for terminals, with in-memory history.
pub struct EditorInput {
    editor: DefaultEditor,
}

impl EditorInput {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| anyhow::anyhow!("creating line editor: {}", e))?;
        Ok(Self { editor })
    }
}

impl LineSource for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!(error = %err, "could not record history entry");
                    }
                }
                Ok(Some(line))
            }
            // No job control: ^C just abandons the line being typed.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("reading line: {}", err)),
        }
    }
}

/// Line reader for piped input: prints the prompt, flushes, reads a line.
pub struct PlainInput<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> PlainInput<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineSource for PlainInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompt_out.write_all(prompt.as_bytes())?;
        self.prompt_out.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}
