//! awsu binary entry point.

use awsu::{Cli, FATAL_EXIT_CODE, Settings, Supervisor};
use clap::Parser;
use rust_common::init_tracing;
use std::process::ExitCode;
use sts_credentials::StsCredentialProvider;
use tracing::error;

fn main() -> ExitCode {
    let settings = match Cli::parse().settings() {
        Ok(settings) => settings,
        Err(e) => e.exit(),
    };

    if let Err(e) = init_tracing(&settings.tracing()) {
        eprintln!("awsu: failed to initialise logging: {e}");
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start the async runtime");
            return ExitCode::from(FATAL_EXIT_CODE);
        }
    };

    let code = runtime.block_on(run(settings));

    // Dropping the runtime drops the renewal task, which owns the temporary
    // credentials directory. Returning (rather than exiting) lets that happen.
    drop(runtime);
    ExitCode::from(code)
}

async fn run(settings: Settings) -> u8 {
    let provider = match StsCredentialProvider::from_env().await {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "Failed to set up credentials");
            return FATAL_EXIT_CODE;
        }
    };

    let mut supervisor = Supervisor::new(provider, settings.spec);
    if let Some(root) = settings.temp_dir {
        supervisor = supervisor.with_store_root(root);
    }

    match supervisor.run(settings.command).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "awsu failed");
            e.exit_code()
        }
    }
}
