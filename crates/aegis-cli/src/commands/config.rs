//! Config command implementation.

use crate::error::Result;
use crate::output::Formatter;
use aegis_gate::GateConfig;

/// Execute the config command.
pub fn execute_config(config: &GateConfig, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.config(config)?.trim_end());
    Ok(())
}
