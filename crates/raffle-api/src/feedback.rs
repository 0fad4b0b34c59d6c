//! Feedback sink that fans cues out to server-sent-event subscribers.

use raffle_core::feedback::{FeedbackCue, FeedbackSink};
use tokio::sync::broadcast;

/// Default number of cues buffered per subscriber.
pub const FEEDBACK_BUFFER: usize = 64;

/// Broadcasts every cue to the current subscribers. Cues emitted while
/// nobody is listening are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastFeedbackSink {
    sender: broadcast::Sender<FeedbackCue>,
}

impl BroadcastFeedbackSink {
    /// Creates a sink buffering up to `capacity` cues per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to cues emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedbackCue> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastFeedbackSink {
    fn default() -> Self {
        Self::new(FEEDBACK_BUFFER)
    }
}

impl FeedbackSink for BroadcastFeedbackSink {
    fn emit(&self, cue: FeedbackCue) {
        // No subscribers is not an error.
        let _ = self.sender.send(cue);
    }
}
