use std::collections::HashSet;
use thiserror::Error;
use crate::security::{ALLOWED_GIT_SUBCOMMANDS, FORBIDDEN_ARG_CHARS, MAX_ARG_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizationError {
    #[error("Empty subcommand")]
    EmptySubcommand,

    #[error("Invalid subcommand name: {0:?}")]
    InvalidSubcommand(String),

    #[error("Git subcommand not allowed: {0}")]
    DisallowedSubcommand(String),

    #[error("Argument {index} is {len} bytes long, over the 4096 byte limit")]
    ArgumentTooLong { index: usize, len: usize },

    #[error("Argument {index} contains a NUL byte")]
    NulByte { index: usize },

    #[error("Argument {index} contains shell metacharacter {ch:?}")]
    ShellMetacharacter { index: usize, ch: char },
}

/// A subcommand and argument vector that passed sanitization.
///
/// Only [`CommandSanitizer::validate`] can build one, so holding a value proves
/// the checks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedCommand {
    subcommand: String,
    args: Vec<String>,
}

impl SanitizedCommand {
    pub fn subcommand(&self) -> &str {
        &self.subcommand
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[derive(Debug)]
pub struct CommandSanitizer {
    allowed_subcommands: HashSet<&'static str>,
}

impl CommandSanitizer {
    pub fn new() -> Self {
        let allowed_subcommands = ALLOWED_GIT_SUBCOMMANDS.iter().copied().collect();

        Self {
            allowed_subcommands,
        }
    }

    /// Validate a subcommand and its arguments before anything is spawned
    pub fn validate<S: AsRef<str>>(
        &self,
        subcommand: &str,
        args: &[S],
    ) -> Result<SanitizedCommand, SanitizationError> {
        self.check_subcommand(subcommand)?;

        for (index, arg) in args.iter().enumerate() {
            check_argument(index, arg.as_ref())?;
        }

        Ok(SanitizedCommand {
            subcommand: subcommand.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        })
    }

    /// Check subcommand shape, then membership in the allowlist
    fn check_subcommand(&self, subcommand: &str) -> Result<(), SanitizationError> {
        if subcommand.is_empty() {
            return Err(SanitizationError::EmptySubcommand);
        }

        let well_formed = subcommand
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !well_formed {
            return Err(SanitizationError::InvalidSubcommand(subcommand.to_string()));
        }

        if !self.allowed_subcommands.contains(subcommand) {
            return Err(SanitizationError::DisallowedSubcommand(
                subcommand.to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_allowed(&self, subcommand: &str) -> bool {
        self.check_subcommand(subcommand).is_ok()
    }
}

impl Default for CommandSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

fn check_argument(index: usize, arg: &str) -> Result<(), SanitizationError> {
    if arg.len() > MAX_ARG_LEN {
        return Err(SanitizationError::ArgumentTooLong {
            index,
            len: arg.len(),
        });
    }

    if arg.contains('\0') {
        return Err(SanitizationError::NulByte { index });
    }

    if let Some(ch) = arg.chars().find(|c| FORBIDDEN_ARG_CHARS.contains(c)) {
        return Err(SanitizationError::ShellMetacharacter { index, ch });
    }

    Ok(())
}
