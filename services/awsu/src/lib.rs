//! awsu: run a command under auto-renewing AWS role credentials.
//!
//! The supervisor assumes a role, publishes the credentials to a private
//! shared-credentials file, points the child at it through a sanitised
//! environment, and keeps the file fresh in the background until the child
//! exits. The child's exit code becomes awsu's own.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod renewal;
pub mod store;
pub mod supervisor;

pub use cli::Cli;
pub use config::Settings;
pub use error::{AwsuError, AwsuResult, FATAL_EXIT_CODE};
pub use renewal::RenewalScheduler;
pub use store::{CredentialStore, StoreError};
pub use supervisor::{ChildCommand, SupervisedProcess, Supervisor};
