//! Redact command implementation.

use super::read_input;
use crate::cli::{OutputFormat, RedactArgs};
use crate::error::Result;
use crate::output::Formatter;
use aegis_redact::RedactionEngine;

/// Execute the redact command.
pub fn execute_redact(args: RedactArgs, formatter: &Formatter) -> Result<()> {
    let text = read_input(args.file.as_deref())?;
    let report = RedactionEngine::standard().redact_with_report(&text);

    println!("{}", formatter.redaction(&report)?);
    // Counts go to stderr so the redacted text stays pipeable
    if args.report && formatter.format() == OutputFormat::Text {
        eprintln!("{}", formatter.redaction_counts(&report));
    }

    Ok(())
}
