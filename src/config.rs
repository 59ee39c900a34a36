use crate::env::{DEFAULT_PATH_ENTRY, SearchPath};

/// Prompt printed before every read.
pub const DEFAULT_PROMPT: &str = "rush> ";

/// Startup settings for an [`crate::Interpreter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Printed before each line is read, without a trailing newline.
    pub prompt: String,
    /// Search path installed at startup, before any `path` built-in runs.
    pub initial_path: Vec<String>,
}

impl ShellConfig {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_initial_path<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_path = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn search_path(&self) -> SearchPath {
        SearchPath::new(self.initial_path.clone())
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            initial_path: vec![DEFAULT_PATH_ENTRY.to_string()],
        }
    }
}
