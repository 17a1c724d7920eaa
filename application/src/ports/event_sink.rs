//! Port for Boomerang event delivery.
//!
//! A run reports everything it does as [`BoomerangEvent`]s. How they reach a
//! user (console, progress bars, a JSONL file, a network stream) is up to the
//! sink. `emit` is synchronous and non-fallible so a slow or broken consumer
//! never changes the outcome of a run.

use boomerang_domain::BoomerangEvent;
use tokio::sync::mpsc;

/// Receiver of run events, in emission order
pub trait BoomerangEventSink: Send + Sync {
    fn emit(&self, event: &BoomerangEvent);
}

/// No-op sink for when nobody is listening
pub struct NoEvents;

impl BoomerangEventSink for NoEvents {
    fn emit(&self, _event: &BoomerangEvent) {}
}

/// Forwards events into an unbounded channel for a consumer task
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<BoomerangEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::UnboundedSender<BoomerangEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BoomerangEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl BoomerangEventSink for ChannelEventSink {
    fn emit(&self, event: &BoomerangEvent) {
        // Consumer may have gone away; the run carries on regardless
        let _ = self.tx.send(event.clone());
    }
}

/// A sink that delegates to multiple inner sinks.
///
/// ```text
/// RunBoomerangUseCase.execute(input, &composite)
///                                      |
///                         +------------+------------+
///                         |                         |
///                 ProgressReporter            JsonlEventLog
/// ```
pub struct CompositeEventSink<'a> {
    delegates: Vec<&'a dyn BoomerangEventSink>,
}

impl<'a> CompositeEventSink<'a> {
    pub fn new(delegates: Vec<&'a dyn BoomerangEventSink>) -> Self {
        Self { delegates }
    }
}

impl BoomerangEventSink for CompositeEventSink<'_> {
    fn emit(&self, event: &BoomerangEvent) {
        for d in &self.delegates {
            d.emit(event);
        }
    }
}
