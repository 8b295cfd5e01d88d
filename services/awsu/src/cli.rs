//! Command-line interface.

use crate::config::Settings;
use crate::supervisor::ChildCommand;
use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use sts_credentials::RoleSpec;
use sts_credentials::config::DEFAULT_SESSION_NAME;

/// Run a command with auto-renewing credentials for an assumed AWS role.
#[derive(Debug, Parser)]
#[command(name = "awsu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Session name of the role to assume.
    #[arg(short, long, default_value = DEFAULT_SESSION_NAME)]
    pub session_name: String,

    /// External id to authenticate the request.
    #[arg(short, long)]
    pub external_id: Option<String>,

    /// Duration of the session in seconds.
    #[arg(
        short,
        long,
        default_value_t = 3600,
        value_parser = clap::value_parser!(u64).range(900..=43_200)
    )]
    pub duration: u64,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines on stderr.
    #[arg(long)]
    pub json_logs: bool,

    /// Directory to create the private credentials directory in.
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Session tag, repeatable.
    #[arg(short = 't', long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Session tag key to mark transitive, repeatable.
    #[arg(long = "transitive-tag", value_name = "KEY")]
    pub transitive_tags: Vec<String>,

    /// Source identity to set on the session.
    #[arg(short = 'i', long)]
    pub source_identity: Option<String>,

    /// Role name or role ARN to assume.
    #[arg(value_name = "ROLE")]
    pub role: String,

    /// Command to run, followed by its arguments.
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Convert parsed arguments into runtime settings.
    ///
    /// # Errors
    ///
    /// Returns a usage error if no command was given.
    pub fn settings(self) -> Result<Settings, clap::Error> {
        let command = ChildCommand::from_argv(self.command).ok_or_else(|| {
            clap::Error::raw(ErrorKind::MissingRequiredArgument, "a command is required\n")
        })?;

        let mut spec = RoleSpec::new(self.role)
            .with_session_name(self.session_name)
            .with_duration(Duration::from_secs(self.duration));
        for (key, value) in self.tags {
            spec = spec.with_tag(key, value);
        }
        for key in self.transitive_tags {
            spec = spec.with_transitive_tag_key(key);
        }
        if let Some(external_id) = self.external_id {
            spec = spec.with_external_id(external_id);
        }
        if let Some(source_identity) = self.source_identity {
            spec = spec.with_source_identity(source_identity);
        }

        Ok(Settings {
            spec,
            command,
            verbose: self.verbose,
            json_logs: self.json_logs,
            temp_dir: self.temp_dir,
        })
    }
}

/// Parse a `key=value` session tag.
fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}
