//! `agglom` entry point.
//!
//! Parses arguments, runs the clustering pipeline and writes the per-level
//! report to stdout. Failures are logged with their machine-readable codes
//! and turned into a non-zero exit status.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use agglom_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render report")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

/// Top-level code of the failure plus the code of the layer that caused it.
fn error_codes(err: &anyhow::Error) -> (Option<&'static str>, Option<&'static str>) {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Core(core)) => {
            let cause = core
                .aggregation_code()
                .map(|code| code.as_str())
                .or_else(|| core.input_code().map(|code| code.as_str()));
            (Some(core.code().as_str()), cause)
        }
        Some(CliError::Provider(provider)) => {
            (None, provider.input_code().map(|code| code.as_str()))
        }
        _ => (None, None),
    }
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let (code, cause_code) = error_codes(&err);
        error!(
            error = %err,
            code = code.map(field::display),
            cause_code = cause_code.map(field::display),
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is not available until logging initialises"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
