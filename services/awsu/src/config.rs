//! Runtime settings derived from the command line.

use crate::supervisor::ChildCommand;
use rust_common::TracingConfig;
use std::path::PathBuf;
use sts_credentials::RoleSpec;

/// Everything awsu needs to run once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Role to assume and session parameters
    pub spec: RoleSpec,
    /// Command to supervise
    pub command: ChildCommand,
    /// Verbose logging
    pub verbose: bool,
    /// JSON log lines instead of plain text
    pub json_logs: bool,
    /// Parent of the credentials directory, system temp dir when unset
    pub temp_dir: Option<PathBuf>,
}

impl Settings {
    /// Tracing configuration matching the requested verbosity.
    #[must_use]
    pub fn tracing(&self) -> TracingConfig {
        let config = TracingConfig::default().with_verbose(self.verbose);
        if self.json_logs {
            config.with_json_output()
        } else {
            config
        }
    }
}
