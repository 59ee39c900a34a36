//! Core data types shared by the lexer, the launcher and the interpreter.

/// Token that separates commands meant to run in parallel.
pub const PARALLEL_MARKER: &str = "&";

/// One command and its arguments, the unit of parallel execution.
///
/// The first token is the command name. Tokens are never empty and never
/// contain whitespace when produced by [`crate::lexer::split_into_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandGroup {
    args: Vec<String>,
}

impl CommandGroup {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }

    /// The command name, if the group has any tokens at all.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// All tokens, command name included.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.args.push(token.into());
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}

impl<S: Into<String>> FromIterator<S> for CommandGroup {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// All command groups read from one input line, in order.
///
/// A batch never holds an empty group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    groups: Vec<CommandGroup>,
}

impl Batch {
    pub fn new(groups: Vec<CommandGroup>) -> Self {
        Self {
            groups: groups.into_iter().filter(|g| !g.is_empty()).collect(),
        }
    }

    pub fn groups(&self) -> &[CommandGroup] {
        &self.groups
    }

    pub fn first(&self) -> Option<&CommandGroup> {
        self.groups.first()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommandGroup> {
        self.groups.iter()
    }

    pub fn into_groups(self) -> Vec<CommandGroup> {
        self.groups
    }

    /// Rebuild an input line that tokenizes back into this batch.
    pub fn to_line(&self) -> String {
        self.groups
            .iter()
            .map(|g| g.args().join(" "))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", PARALLEL_MARKER))
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a CommandGroup;
    type IntoIter = std::slice::Iter<'a, CommandGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// How a line is dispatched, decided once per cycle from the first token of
/// the first group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Exit,
    Cd,
    Path,
    External,
}

impl CommandKind {
    pub fn of(name: &str) -> Self {
        match name {
            "exit" => CommandKind::Exit,
            "cd" => CommandKind::Cd,
            "path" => CommandKind::Path,
            _ => CommandKind::External,
        }
    }

    pub fn is_builtin(self) -> bool {
        self != CommandKind::External
    }
}

/// What the read loop should do after one line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_drops_empty_groups() {
        let batch = Batch::new(vec![
            CommandGroup::from_iter(["ls"]),
            CommandGroup::default(),
        ]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.first().and_then(CommandGroup::name), Some("ls"));
    }

    #[test]
    fn test_to_line_joins_groups_with_marker() {
        let batch = Batch::new(vec![
            CommandGroup::from_iter(["echo", "a"]),
            CommandGroup::from_iter(["ls"]),
        ]);
        assert_eq!(batch.to_line(), "echo a & ls");
    }

    #[test]
    fn test_command_kind_of() {
        assert_eq!(CommandKind::of("exit"), CommandKind::Exit);
        assert_eq!(CommandKind::of("cd"), CommandKind::Cd);
        assert_eq!(CommandKind::of("path"), CommandKind::Path);
        assert_eq!(CommandKind::of("ls"), CommandKind::External);
        assert_eq!(CommandKind::of("Exit"), CommandKind::External);
        assert!(!CommandKind::External.is_builtin());
        assert!(CommandKind::Cd.is_builtin());
    }
}
