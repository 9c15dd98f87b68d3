//! External email lookup.
//!
//! An [`EmailLookup`] is consulted before any configured address. The
//! production implementation, [`CommandLookup`], runs a user-supplied
//! program as `<command> <initials> <name> <username>` and treats its
//! trimmed standard output as the email address. Any closure with the right
//! signature is also an `EmailLookup`, which keeps the resolver testable
//! without spawning processes.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::errors::LookupError;

/// Capability that maps an author to an email address.
///
/// Returning an empty string means "no answer"; the resolver then moves on
/// to the configured addresses. Returning an error aborts the lookup.
pub trait EmailLookup {
    fn lookup(&self, initials: &str, name: &str, username: &str) -> Result<String, LookupError>;
}

impl<F> EmailLookup for F
where
    F: Fn(&str, &str, &str) -> Result<String, LookupError>,
{
    fn lookup(&self, initials: &str, name: &str, username: &str) -> Result<String, LookupError> {
        self(initials, name, username)
    }
}

/// Runs an external program to look up an email address.
#[derive(Debug, Clone)]
pub struct CommandLookup {
    command: String,
}

impl CommandLookup {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl EmailLookup for CommandLookup {
    fn lookup(&self, initials: &str, name: &str, username: &str) -> Result<String, LookupError> {
        debug!(command = %self.command, initials, "running email lookup command");

        // No timeout: the command runs to completion.
        let output = Command::new(&self.command)
            .args([initials, name, username])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| LookupError::CommandSpawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let exit_code = output.status.code().unwrap_or(-1);
            return Err(LookupError::CommandFailed {
                command: self.command.clone(),
                exit_code,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
