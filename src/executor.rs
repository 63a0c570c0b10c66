//! Executor Module
//!
//! Runs decoded commands against a storage instance.
//!
//! ## Responsibilities
//! - Route each command to the matching storage operation
//! - Refuse commands that would break storage invariants
//!
//! The executor borrows the storage mutably for as long as it lives. The
//! connection handler creates one per batch while holding the storage lock, so
//! a whole batch runs without interleaving with other connections.

use crate::error::{MetricsError, Result};
use crate::protocol::{Command, CommandResult};
use crate::storage::{Storage, WILDCARD};

/// Dispatches commands to a borrowed [`Storage`]
pub struct Executor<'a> {
    storage: &'a mut Storage,
}

impl<'a> Executor<'a> {
    pub fn new(storage: &'a mut Storage) -> Self {
        Self { storage }
    }

    /// Execute a command
    pub fn run(&mut self, command: Command) -> Result<CommandResult> {
        match command {
            Command::Put {
                key,
                value,
                timestamp,
            } => {
                // `*` only ever means "all metrics"
                if key == WILDCARD {
                    return Err(MetricsError::Execution(
                        "wildcard key is reserved".to_string(),
                    ));
                }
                self.storage.put(&key, value, timestamp);
                Ok(CommandResult::Stored)
            }
            Command::Get { key } => Ok(CommandResult::Samples(self.storage.get(&key))),
        }
    }

    /// Execute every command of a batch in order.
    ///
    /// Stops at the first refused command; commands before it stay applied.
    pub fn run_batch(&mut self, commands: Vec<Command>) -> Result<Vec<CommandResult>> {
        commands.into_iter().map(|command| self.run(command)).collect()
    }
}
