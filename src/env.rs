/// Directory searched when nothing else has been configured.
pub const DEFAULT_PATH_ENTRY: &str = "/bin";

/// Ordered list of directories searched for external commands.
///
/// The first directory holding a matching executable wins. The interpreter
/// owns the single instance and lends it to the launcher for every command;
/// only the `path` built-in mutates it, and only between batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<String>,
}

impl SearchPath {
    pub fn new(dirs: Vec<String>) -> Self {
        Self { dirs }
    }

    /// Drop every current entry and install `dirs` in the given order.
    ///
    /// An empty list is valid and makes every external command unresolvable.
    pub fn replace(&mut self, dirs: Vec<String>) {
        self.dirs = dirs;
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new(vec![DEFAULT_PATH_ENTRY.to_string()])
    }
}
