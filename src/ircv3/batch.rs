//! Batch tracking for the IRCv3 batch capability.
//!
//! Servers bracket related messages with `BATCH +ref` / `BATCH -ref`.
//! NAMES replies inside a batch are buffered per channel and flushed as
//! one list per channel when the batch closes.

use std::collections::HashMap;

/// State for one open batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchContext {
    /// The batch type from the opening BATCH parameters (may be empty).
    pub batch_type: String,
    /// NAMES nicks buffered per channel, in first-seen channel order.
    names: Vec<(String, Vec<String>)>,
}

impl BatchContext {
    fn new(batch_type: impl Into<String>) -> Self {
        Self {
            batch_type: batch_type.into(),
            names: Vec::new(),
        }
    }

    /// Buffer a NAMES reply. Replies for the same channel accumulate.
    pub fn buffer_names<I, S>(&mut self, channel: &str, nicks: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nicks = nicks.into_iter().map(Into::into);
        match self.names.iter_mut().find(|(ch, _)| ch == channel) {
            Some((_, existing)) => existing.extend(nicks),
            None => self.names.push((channel.to_string(), nicks.collect())),
        }
    }

    /// Consume the buffered NAMES lists in first-seen channel order.
    pub fn take_names(self) -> Vec<(String, Vec<String>)> {
        self.names
    }
}

/// All batches currently open on a connection.
#[derive(Clone, Debug, Default)]
pub struct BatchRegistry {
    open: HashMap<String, BatchContext>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a batch. A reused reference replaces the old batch.
    pub fn open(&mut self, reference: &str, batch_type: &str) {
        self.open
            .insert(reference.to_string(), BatchContext::new(batch_type));
    }

    /// Close a batch, returning its buffered state.
    pub fn close(&mut self, reference: &str) -> Option<BatchContext> {
        self.open.remove(reference)
    }

    /// Whether a batch with this reference is open.
    pub fn contains(&self, reference: &str) -> bool {
        self.open.contains_key(reference)
    }

    /// Mutable access to an open batch.
    pub fn get_mut(&mut self, reference: &str) -> Option<&mut BatchContext> {
        self.open.get_mut(reference)
    }
}
