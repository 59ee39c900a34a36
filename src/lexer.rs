//! Splits a raw input line into a [`Batch`] of parallel command groups.

use crate::command::{Batch, CommandGroup, PARALLEL_MARKER};

/// Characters that separate tokens: space, tab, CR, LF, VT and FF.
fn is_delimiter(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '\x0B' | '\x0C')
}

/// Accumulates tokens into groups, closing a group at every marker.
struct GroupCollector {
    groups: Vec<CommandGroup>,
    current: CommandGroup,
}

impl GroupCollector {
    fn new() -> Self {
        GroupCollector {
            groups: Vec::new(),
            current: CommandGroup::default(),
        }
    }

    fn feed(&mut self, token: &str) {
        if token == PARALLEL_MARKER {
            self.close_group();
        } else {
            self.current.push(token);
        }
    }

    /// Closes the group being built. An empty group is simply dropped, so
    /// `a & & b` and a trailing `&` never yield a phantom command.
    fn close_group(&mut self) {
        let group = std::mem::take(&mut self.current);
        if !group.is_empty() {
            self.groups.push(group);
        }
    }

    fn finish(mut self) -> Batch {
        self.close_group();
        Batch::new(self.groups)
    }
}

/// Tokenize `line` into a batch.
///
/// Whitespace-only input produces an empty batch, which the interpreter
/// treats as "do nothing".
pub fn split_into_batch(line: &str) -> Batch {
    let mut collector = GroupCollector::new();
    line.split(is_delimiter)
        .map(|piece| piece.trim_matches(is_delimiter))
        .filter(|piece| !piece.is_empty())
        .for_each(|token| collector.feed(token));
    collector.finish()
}
