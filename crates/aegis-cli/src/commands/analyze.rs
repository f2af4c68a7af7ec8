//! Analyze command implementation.

use super::read_input;
use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use aegis_gate::GateConfig;
use aegis_redact::RedactionEngine;
use tracing::info;

/// Execute the analyze command.
///
/// Unlike the gate, this always prints the verdict: the user asked for it.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    config: &GateConfig,
    formatter: &Formatter,
) -> Result<()> {
    let text = read_input(args.file.as_deref())?;
    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("Message is empty".to_string()));
    }

    let report = RedactionEngine::standard().redact_with_report(&text);
    info!(
        "Sending {} chars to {} ({} spans redacted)",
        report.text.chars().count(),
        config.endpoint,
        report.total()
    );

    let classifier = config.classifier()?;
    let outcome = classifier.analyze(&report.text).await?;

    println!("{}", formatter.outcome(&outcome, &report.text)?);
    Ok(())
}
