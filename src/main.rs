//! execgate: sandboxed subprocess execution gateway.
//!
//! This is the main entry point for the `execgate` CLI. It parses arguments,
//! initializes logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

use execgate::cli::Cli;
use execgate::error::GatewayError;
use execgate::{commands, exit_codes, logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init_tracing(&cli.global.tracing_config());

    match commands::dispatch(cli).await {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {:#}", err);

            let code = err
                .downcast_ref::<GatewayError>()
                .map(GatewayError::exit_code)
                .unwrap_or(exit_codes::RUNTIME_FAILURE);
            ExitCode::from(code as u8)
        }
    }
}
