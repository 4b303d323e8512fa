#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in nbs
//!
//! Every diagnostic produced while resolving packages travels through an
//! unbounded channel as an [`EventMessage`]. Library crates never print;
//! the CLI drains the channel and decides what reaches the terminal and
//! the log file.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: probe, download and resolution events live in
//!   their own modules and are aggregated by [`AppEvent`]
//! - **Unified `EventEmitter` trait**: one API for raw senders and for
//!   structs that carry one
//! - **Metadata envelope**: every event is stamped with an [`EventMeta`]
//!   carrying level, source and the package it belongs to

pub mod buffer;
pub mod events;
pub mod meta;

pub use buffer::EventBuffer;
pub use events::{
    AppEvent, DownloadEvent, FailureContext, GeneralEvent, ProbeEvent, ResolutionEvent,
};
pub use meta::{EventLevel, EventMeta, EventSource};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Envelope that pairs an event with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Build metadata from the event's own level, source and package.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        if let Some(package) = event.package() {
            meta = meta.with_correlation_id(package);
        }
        Self { meta, event }
    }
}

/// Type alias for the event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for the event receiver
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout nbs
///
/// Works the same whether you hold a raw `EventSender` or a struct that
/// contains one. A missing sender silently drops events.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Hook for adding labels before a message is sent
    fn enrich_event_meta(&self, _event: &AppEvent, _meta: &mut EventMeta) {}

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let mut meta = meta;
            self.enrich_event_meta(&event, &mut meta);
            // Receiver may be gone during shutdown
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let EventMessage { meta, event } = EventMessage::from_event(event);
        self.emit_with_meta(meta, event);
    }

    fn emit_probe(&self, event: ProbeEvent) {
        self.emit(AppEvent::Probe(event));
    }

    fn emit_download(&self, event: DownloadEvent) {
        self.emit(AppEvent::Download(event));
    }

    fn emit_resolution(&self, event: ResolutionEvent) {
        self.emit(AppEvent::Resolution(event));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
