//! Command implementations.

pub mod analyze;
pub mod config;
pub mod redact;
pub mod watch;

pub use self::analyze::execute_analyze;
pub use self::config::execute_config;
pub use self::redact::execute_redact;
pub use self::watch::execute_watch;

use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// Read a whole message from `file`, or from stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
