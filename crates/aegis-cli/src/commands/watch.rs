//! Watch command implementation.
//!
//! Feeds stdin into an in-memory document: every block of non-empty lines,
//! terminated by a blank line or end of input, is an HTML fragment opened as
//! a new message. The gate runs over that document exactly as it would over a
//! page.

use crate::cli::WatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use aegis_domain::{DocumentSource, Element, NodeId};
use aegis_gate::{DocumentError, Gate, GateConfig, MemoryDocument, Presentation};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Classes of the element each opened message is wrapped in (Gmail's body)
pub const MESSAGE_CLASSES: &str = "a3s aiL";

/// Splits a line stream into blank-line separated messages.
#[derive(Debug, Default)]
pub struct MessageBlocks {
    lines: Vec<String>,
}

impl MessageBlocks {
    /// Create an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns a finished message when `line` is blank.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return self.finish();
        }
        self.lines.push(line.to_string());
        None
    }

    /// Flush whatever is buffered.
    pub fn finish(&mut self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.lines).join("\n"))
    }
}

/// Document that prints notifications to the terminal as they are raised.
#[derive(Debug, Clone)]
struct ConsoleDocument {
    inner: MemoryDocument,
    formatter: Formatter,
}

impl DocumentSource for ConsoleDocument {
    type Error = DocumentError;

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.inner.query_all(selector)
    }

    fn inner_text(&self, node: NodeId) -> Option<String> {
        self.inner.inner_text(node)
    }

    fn insert_first_child(
        &mut self,
        container: NodeId,
        element: Element,
    ) -> std::result::Result<NodeId, Self::Error> {
        self.inner.insert_first_child(container, element)
    }

    fn find_marked(&self, marker: &str) -> Option<NodeId> {
        self.inner.find_marked(marker)
    }

    fn remove(&mut self, node: NodeId) -> std::result::Result<(), Self::Error> {
        self.inner.remove(node)
    }

    fn alert(&mut self, message: &str) {
        self.inner.alert(message);
        println!("{}\n", self.formatter.notification(message));
    }
}

/// Execute the watch command.
///
/// A terminal has no page to decorate, so verdicts are always presented as
/// notifications. Piped input is paced so that every message gets its own
/// debounce trigger.
pub async fn execute_watch(
    args: WatchArgs,
    mut config: GateConfig,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(debounce_ms) = args.debounce_ms {
        config.debounce_ms = debounce_ms;
    }
    if let Some(min_length) = args.min_length {
        config.min_length = min_length;
    }
    config.presentation = Presentation::Notification;
    config.validate().map_err(CliError::Config)?;

    let stdin = tokio::io::stdin();
    let pace = match args.pace_ms {
        Some(pace_ms) => Some(Duration::from_millis(pace_ms)),
        None if !std::io::stdin().is_terminal() => Some(config.debounce() * 2),
        None => None,
    };

    let classifier = config.classifier()?;
    let document = MemoryDocument::new();
    let mutations = document.observe();
    let console = ConsoleDocument {
        inner: document.clone(),
        formatter: *formatter,
    };
    let selector = config.selector.clone();
    let gate = Gate::new(config, console, classifier);
    let running = tokio::spawn(gate.run(mutations));

    info!("Reading messages from stdin (blank line between messages)");
    let opened = feed_messages(BufReader::new(stdin), &document, pace).await?;

    debug!("End of input after {} messages", opened);
    document.disconnect();
    let metrics = running.await?;

    if opened > 0 && document.query_all(&selector).is_empty() {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "Selector '{}' matched none of the {} messages",
                selector, opened
            ))
        );
    }
    eprintln!("{}", formatter.metrics(&metrics));
    Ok(())
}

/// Open every message read from `reader`, `pace` apart; returns the count
pub async fn feed_messages<R>(
    reader: R,
    document: &MemoryDocument,
    pace: Option<Duration>,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut blocks = MessageBlocks::new();
    let mut lines = reader.lines();
    let mut opened = 0usize;
    while let Some(line) = lines.next_line().await? {
        if let Some(message) = blocks.push_line(&line) {
            pause(pace, opened).await;
            open_message(document, &message)?;
            opened += 1;
        }
    }
    if let Some(message) = blocks.finish() {
        pause(pace, opened).await;
        open_message(document, &message)?;
        opened += 1;
    }
    Ok(opened)
}

async fn pause(pace: Option<Duration>, opened: usize) {
    if let (Some(pace), true) = (pace, opened > 0) {
        tokio::time::sleep(pace).await;
    }
}

/// Append `message` (HTML) to the document inside a message body element
pub fn open_message(document: &MemoryDocument, message: &str) -> Result<NodeId> {
    let markup = format!("<div class=\"{}\">{}</div>", MESSAGE_CLASSES, message);
    let node = document
        .append_html(document.root(), &markup)?
        .into_iter()
        .next()
        .ok_or(DocumentError::NoElement(markup))?;
    debug!("Opened message as {}", node);
    Ok(node)
}
