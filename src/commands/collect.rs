//! Implementation of the `execgate collect` command.

use super::request_from_args;
use crate::cli::CollectArgs;
use crate::error::{GatewayError, Result};
use crate::exec::render_note;
use crate::gateway::Gateway;
use std::io::Write;

pub async fn cmd_collect(gateway: &Gateway, args: CollectArgs) -> Result<i32> {
    let request = request_from_args(args.exec)?;
    let collected = gateway.collect(&request).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&collected.to_response()).map_err(|e| {
            GatewayError::UserError(format!("failed to serialize response: {}", e))
        })?;
        println!("{}", json);
    } else {
        let at_line_start = collected.combined.last().is_none_or(|&b| b == b'\n');
        std::io::stdout()
            .write_all(&collected.combined)
            .and_then(|()| std::io::stdout().flush())
            .map_err(|e| GatewayError::UserError(format!("failed to write output: {}", e)))?;
        if let Some(note) = render_note(&collected.result, at_line_start) {
            eprint!("{}", note);
        }
    }

    Ok(collected.result.process_exit_code())
}
