//! Change watcher
//!
//! Coalesces a burst of document mutations into a single trigger. Every
//! mutation pushes the deadline back by the quiescence window; only the
//! deadline set by the last mutation of a burst fires.

use std::pin::Pin;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Duration, Instant, Sleep};
use tracing::trace;

/// A fired debounce deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Mutations coalesced into this trigger
    pub mutations: usize,
}

enum Wake {
    Deadline,
    Mutation,
    Closed,
}

/// Debouncing wrapper around a mutation stream
pub struct ChangeWatcher<M> {
    window: Duration,
    mutations: UnboundedReceiver<M>,
    pending: Option<Pin<Box<Sleep>>>,
    closed: bool,
    coalesced: usize,
}

impl<M> ChangeWatcher<M> {
    /// Watch `mutations` with the given quiescence window
    pub fn new(mutations: UnboundedReceiver<M>, window: Duration) -> Self {
        Self {
            window,
            mutations,
            pending: None,
            closed: false,
            coalesced: 0,
        }
    }

    /// Quiescence window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// True if a deadline is scheduled
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the next trigger
    ///
    /// Returns `None` once the mutation stream is closed and no deadline is
    /// pending. A deadline scheduled before the stream closed still fires.
    /// Cancel-safe: dropping the future keeps the scheduled deadline.
    pub async fn next_trigger(&mut self) -> Option<Trigger> {
        loop {
            let wake = match self.pending.as_mut() {
                Some(deadline) if self.closed => {
                    deadline.await;
                    Wake::Deadline
                }
                Some(deadline) => {
                    tokio::select! {
                        _ = deadline => Wake::Deadline,
                        received = self.mutations.recv() => match received {
                            Some(_) => Wake::Mutation,
                            None => Wake::Closed,
                        },
                    }
                }
                None if self.closed => return None,
                None => match self.mutations.recv().await {
                    Some(_) => Wake::Mutation,
                    None => Wake::Closed,
                },
            };

            match wake {
                Wake::Deadline => {
                    self.pending = None;
                    let mutations = std::mem::take(&mut self.coalesced);
                    trace!("Debounce fired after {} mutations", mutations);
                    return Some(Trigger { mutations });
                }
                Wake::Mutation => {
                    self.coalesced += 1;
                    self.reschedule();
                }
                Wake::Closed => {
                    trace!("Mutation stream closed");
                    self.closed = true;
                }
            }
        }
    }

    fn reschedule(&mut self) {
        let deadline = Instant::now() + self.window;
        match self.pending.as_mut() {
            Some(sleep) => sleep.as_mut().reset(deadline),
            None => self.pending = Some(Box::pin(sleep_until(deadline))),
        }
    }
}
