//! Output redirection: `command [args...] > file`.
//!
//! The rules are stricter than a POSIX shell. Every `>` character inside any
//! token counts as an operator, so `>>` and `a>b` are rejected instead of being
//! read as append or as a glued redirection.

use crate::command::CommandGroup;
use crate::error::{RedirectionFault, ShellError};

pub const REDIRECT_OPERATOR: char = '>';

/// What a scan of one command group found about redirection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectionSpec {
    /// Number of `>` characters across all tokens.
    pub count: usize,
    /// Index of the first token that is exactly `>`.
    pub operator_index: Option<usize>,
    /// Token right after the operator, if there is one.
    pub destination: Option<String>,
    /// Tokens after the operator token.
    pub trailing: usize,
}

impl RedirectionSpec {
    pub fn scan(group: &CommandGroup) -> Self {
        let args = group.args();
        let count = args
            .iter()
            .map(|token| token.matches(REDIRECT_OPERATOR).count())
            .sum();
        let operator_index = args
            .iter()
            .position(|token| token.len() == 1 && token.starts_with(REDIRECT_OPERATOR));
        let destination = operator_index.and_then(|i| args.get(i + 1).cloned());
        let trailing = operator_index.map_or(0, |i| args.len() - i - 1);
        RedirectionSpec {
            count,
            operator_index,
            destination,
            trailing,
        }
    }

    /// Whether the group mentions `>` at all.
    pub fn is_requested(&self) -> bool {
        self.count > 0
    }

    /// Returns the operator index when the redirection is well formed.
    pub fn validate(&self) -> Result<usize, RedirectionFault> {
        if self.count > 1 {
            return Err(RedirectionFault::MultipleOperators);
        }
        let index = self
            .operator_index
            .ok_or(RedirectionFault::DetachedOperator)?;
        if index == 0 {
            return Err(RedirectionFault::MissingCommand);
        }
        match self.trailing {
            0 => Err(RedirectionFault::MissingTarget),
            1 => Ok(index),
            _ => Err(RedirectionFault::ExtraTargets),
        }
    }
}

/// A command group with any redirection stripped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirected {
    pub group: CommandGroup,
    pub destination: Option<String>,
}

/// Validate and strip the redirection in `group`, if it has one.
///
/// Groups without any `>` pass through untouched. On success the operator and
/// the file name are no longer part of the returned group.
pub fn parse_redirection(group: CommandGroup) -> Result<Redirected, ShellError> {
    let spec = RedirectionSpec::scan(&group);
    if !spec.is_requested() {
        return Ok(Redirected {
            group,
            destination: None,
        });
    }

    let index = spec.validate().map_err(ShellError::Redirection)?;
    let mut args = group.into_args();
    args.truncate(index);
    Ok(Redirected {
        group: CommandGroup::new(args),
        destination: spec.destination,
    })
}
