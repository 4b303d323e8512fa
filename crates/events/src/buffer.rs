//! Deferred delivery of events produced by concurrent workers.

use crate::{channel, AppEvent, EventEmitter, EventMessage, EventReceiver, EventSender};

/// Collects events from many tasks and releases them in one ordered batch.
///
/// Workers receive clones of [`EventBuffer::sender`]; nothing reaches the
/// downstream channel until [`EventBuffer::flush_into`] runs, so diagnostics
/// of one package are never interleaved with those of another.
#[derive(Debug)]
pub struct EventBuffer {
    sender: EventSender,
    receiver: EventReceiver,
}

impl EventBuffer {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Sender handle for a worker.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Take every buffered message in arrival order.
    pub fn drain(&mut self) -> Vec<EventMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Forward buffered messages to `target`, grouped by `rank`.
    ///
    /// The sort is stable: messages sharing a rank keep their arrival order.
    /// Returns the number of forwarded messages.
    pub fn flush_into<E, F>(&mut self, target: &E, rank: F) -> usize
    where
        E: EventEmitter + ?Sized,
        F: Fn(&AppEvent) -> u8,
    {
        let mut messages = self.drain();
        messages.sort_by_key(|message| rank(&message.event));
        let count = messages.len();
        for EventMessage { meta, event } in messages {
            target.emit_with_meta(meta, event);
        }
        count
    }

    /// Drop everything buffered so far.
    pub fn discard(&mut self) -> usize {
        self.drain().len()
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEmitter for EventBuffer {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.sender)
    }
}
