//! Supervisor error types.

use crate::store::StoreError;
use std::io;
use sts_credentials::ProviderError;
use thiserror::Error;

/// Exit code for failures of awsu itself, as opposed to the child's own code.
pub const FATAL_EXIT_CODE: u8 = 125;

/// Errors that stop awsu before or while supervising the child.
#[derive(Error, Debug)]
pub enum AwsuError {
    /// Credential acquisition failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Credentials could not be written to disk
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The child executable could not be started
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Observing the child's completion failed
    #[error("an error occurred waiting for the command: {0}")]
    Wait(#[source] io::Error),

    /// Signal handlers could not be installed
    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] io::Error),

    /// A termination signal arrived before the child was started
    #[error("interrupted by signal {0} before the command started")]
    Interrupted(i32),
}

/// Result type for supervisor operations.
pub type AwsuResult<T> = Result<T, AwsuError>;

impl AwsuError {
    /// Exit code awsu terminates with for this error.
    ///
    /// An interruption follows the shell convention of `128 + signal`; every
    /// other error is [`FATAL_EXIT_CODE`].
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Interrupted(signal) => u8::try_from(128 + signal).unwrap_or(u8::MAX),
            _ => FATAL_EXIT_CODE,
        }
    }
}
