//! Implementation of the `execgate config show` command.

use crate::config::GatewayConfig;
use crate::error::Result;

/// Print the effective configuration (file plus CLI roots) as YAML.
///
/// The config is not validated so an incomplete one can still be inspected.
pub fn cmd_config_show(config: &GatewayConfig) -> Result<()> {
    print!("{}", config.to_yaml()?);
    Ok(())
}
