//! Child process supervision.
//!
//! The supervisor acquires the first credentials, hands renewal to a
//! background task, then runs the child with inherited stdio and a sanitised
//! environment until it exits.
//!
//! Signal handlers are installed before anything touches the disk. A SIGTERM,
//! SIGHUP or SIGINT that arrives before the child starts aborts the run and
//! removes the temporary directory. Once the child runs, SIGTERM and SIGHUP
//! are forwarded to it. SIGINT is not: a terminal already delivers it to the
//! child's process group, and a second copy would read as a repeated Ctrl-C.
//! Either way awsu keeps waiting until the child exits.

use crate::environment;
use crate::error::{AwsuError, AwsuResult};
use crate::renewal::RenewalScheduler;
use crate::store::CredentialStore;
use rust_common::human_duration;
use signals::Relay;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use sts_credentials::{CredentialProvider, RoleSpec};
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Program and arguments to run under supervision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCommand {
    /// Executable name or path
    pub program: OsString,
    /// Arguments passed to the program
    pub args: Vec<OsString>,
}

impl ChildCommand {
    /// Create a command from a program and its arguments.
    #[must_use]
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split an argv into program and arguments. `None` if empty.
    #[must_use]
    pub fn from_argv(argv: Vec<OsString>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }

    fn display_program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// A running child and the command it was started from.
#[derive(Debug)]
pub struct SupervisedProcess {
    command: ChildCommand,
    child: Child,
}

impl SupervisedProcess {
    /// Start `command` with exactly `env` and the parent's stdio.
    ///
    /// # Errors
    ///
    /// Returns [`AwsuError::Spawn`] if the executable cannot be started.
    pub fn spawn(command: ChildCommand, env: &[(OsString, OsString)]) -> AwsuResult<Self> {
        let child = Command::new(&command.program)
            .args(&command.args)
            .env_clear()
            .envs(env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| AwsuError::Spawn {
                program: command.display_program(),
                source,
            })?;

        debug!(program = %command.display_program(), pid = ?child.id(), "Spawned child");
        Ok(Self { command, child })
    }

    /// Operating system process id while the child is running.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit, handing signals received meanwhile to `relay`.
    async fn wait(mut self, relay: &mut Relay) -> AwsuResult<ExitStatus> {
        let status = relay
            .wait_forwarding(&mut self.child)
            .await
            .map_err(AwsuError::Wait)?;
        debug!(program = %self.command.display_program(), %status, "Child exited");
        Ok(status)
    }
}

/// Exit code mirroring the child's termination.
///
/// Exit codes pass through verbatim; a signal `n` maps to `128 + n`.
#[must_use]
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(u8::MAX);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(u8::MAX);
        }
    }

    crate::error::FATAL_EXIT_CODE
}

/// Runs one child under auto-renewing role credentials.
pub struct Supervisor<P> {
    provider: P,
    spec: RoleSpec,
    parent_env: Vec<(OsString, OsString)>,
    store_root: Option<PathBuf>,
}

impl<P: CredentialProvider + 'static> Supervisor<P> {
    /// Create a supervisor inheriting this process's environment.
    #[must_use]
    pub fn new(provider: P, spec: RoleSpec) -> Self {
        Self {
            provider,
            spec,
            parent_env: std::env::vars_os().collect(),
            store_root: None,
        }
    }

    /// Create the temporary credentials directory under `root` instead of the
    /// system temporary directory.
    #[must_use]
    pub fn with_store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.store_root = Some(root.into());
        self
    }

    /// Use `env` instead of this process's environment as the parent environment.
    #[must_use]
    pub fn with_parent_environment<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.parent_env = env.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Acquire credentials, start renewal, run `command` and return its exit code.
    ///
    /// # Errors
    ///
    /// Fails before launching the child if signal handlers cannot be
    /// installed, if the first acquisition or publish fails, or with
    /// [`AwsuError::Interrupted`] if a termination signal arrives first. After
    /// launch it fails only if the child cannot be spawned or awaited.
    /// Renewal failures are logged by the background task and never returned.
    pub async fn run(self, command: ChildCommand) -> AwsuResult<u8> {
        let mut relay = Relay::install().map_err(AwsuError::Signals)?;

        let profile = environment::active_profile(&self.parent_env);
        let store = match &self.store_root {
            Some(root) => CredentialStore::create_in(root, profile)?,
            None => CredentialStore::create(profile)?,
        };
        debug!(
            path = %store.location().display(),
            profile = store.profile(),
            "Created credentials store"
        );

        // Dropping the start future on a signal drops the store with it.
        let scheduler = tokio::select! {
            started = RenewalScheduler::start(self.provider, self.spec.clone(), store) => started?,
            signal = relay.recv() => return Err(AwsuError::Interrupted(signal)),
        };

        let location = scheduler.location().to_path_buf();
        let renewal_in = human_duration(scheduler.time_until_renewal());
        // Detached; dropping the runtime drops the task and the store it owns.
        let _renewal = scheduler.spawn();

        let env = environment::sanitize(self.parent_env, &location);
        let process = SupervisedProcess::spawn(command, &env)?;

        info!(
            command = %process.command.display_program(),
            pid = ?process.id(),
            role = %self.spec.role,
            %renewal_in,
            "Running command with assumed role"
        );

        let status = process.wait(&mut relay).await?;
        Ok(exit_code(status))
    }
}

#[cfg(unix)]
mod signals {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;
    use std::io;
    use std::process::ExitStatus;
    use tokio::process::Child;
    use tokio::signal::unix::{self, SignalKind};
    use tracing::{debug, warn};

    /// Termination signals delivered to awsu.
    pub(super) struct Relay {
        terminate: unix::Signal,
        hangup: unix::Signal,
        interrupt: unix::Signal,
    }

    impl Relay {
        /// Take over SIGTERM, SIGHUP and SIGINT for the rest of the process.
        pub(super) fn install() -> io::Result<Self> {
            Ok(Self {
                terminate: unix::signal(SignalKind::terminate())?,
                hangup: unix::signal(SignalKind::hangup())?,
                interrupt: unix::signal(SignalKind::interrupt())?,
            })
        }

        /// Wait for the next signal and return its number.
        pub(super) async fn recv(&mut self) -> i32 {
            self.next().await as i32
        }

        async fn next(&mut self) -> Signal {
            tokio::select! {
                Some(()) = self.terminate.recv() => Signal::SIGTERM,
                Some(()) = self.hangup.recv() => Signal::SIGHUP,
                Some(()) = self.interrupt.recv() => Signal::SIGINT,
                else => std::future::pending().await,
            }
        }

        /// Wait for `child`, forwarding SIGTERM and SIGHUP and absorbing SIGINT.
        pub(super) async fn wait_forwarding(&mut self, child: &mut Child) -> io::Result<ExitStatus> {
            loop {
                tokio::select! {
                    status = child.wait() => return status,
                    signal = self.next() => match signal {
                        Signal::SIGINT => debug!("Interrupt received, waiting for child"),
                        signal => forward(child, signal),
                    },
                }
            }
        }
    }

    fn forward(child: &Child, signal: Signal) {
        let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
            return;
        };
        debug!(signal = signal.as_str(), pid, "Forwarding signal to child");
        if let Err(e) = kill(Pid::from_raw(pid), signal) {
            warn!(signal = signal.as_str(), pid, error = %e, "Failed to forward signal");
        }
    }
}

#[cfg(not(unix))]
mod signals {
    use std::io;
    use std::process::ExitStatus;
    use tokio::process::Child;

    pub(super) struct Relay;

    impl Relay {
        pub(super) const fn install() -> io::Result<Self> {
            Ok(Self)
        }

        pub(super) async fn recv(&mut self) -> i32 {
            std::future::pending().await
        }

        pub(super) async fn wait_forwarding(&mut self, child: &mut Child) -> io::Result<ExitStatus> {
            child.wait().await
        }
    }
}
