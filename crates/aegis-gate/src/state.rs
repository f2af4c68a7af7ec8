//! Extraction state and the dedup gate

/// Result of offering a message text to the dedup gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// New, substantial text; committed under `epoch`
    Fresh {
        /// The committed text
        text: String,
        /// Epoch assigned to this message
        epoch: u64,
    },

    /// Same text as the last processed message
    Unchanged,

    /// Text not longer than the minimum length
    TooShort {
        /// Length of the rejected text in characters
        length: usize,
    },
}

/// Dedup state owned by the gate
///
/// `epoch` starts at 0 and advances each time a message passes the gate, so
/// a response tagged with an older epoch belongs to a message that is no
/// longer active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionState {
    last_processed_text: String,
    epoch: u64,
}

impl ExtractionState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer the active message's text to the gate
    ///
    /// On pass the text is committed and the epoch advanced before any
    /// request is sent, so a second trigger with the same text is suppressed
    /// even while the first request is in flight.
    ///
    /// # Examples
    ///
    /// ```
    /// use aegis_gate::{Extraction, ExtractionState};
    ///
    /// let mut state = ExtractionState::new();
    /// let text = "Your mailbox is full, verify your password here today".to_string();
    ///
    /// assert!(matches!(state.observe(text.clone(), 20), Extraction::Fresh { epoch: 1, .. }));
    /// assert_eq!(state.observe(text, 20), Extraction::Unchanged);
    /// ```
    pub fn observe(&mut self, text: String, min_length: usize) -> Extraction {
        if text == self.last_processed_text {
            return Extraction::Unchanged;
        }

        let length = text.chars().count();
        if length <= min_length {
            return Extraction::TooShort { length };
        }

        self.last_processed_text.clone_from(&text);
        self.epoch += 1;
        Extraction::Fresh {
            text,
            epoch: self.epoch,
        }
    }

    /// True if `epoch` belongs to the most recently committed message
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    /// Epoch of the most recently committed message (0 before the first)
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Text of the most recently committed message
    pub fn last_processed_text(&self) -> &str {
        &self.last_processed_text
    }
}
