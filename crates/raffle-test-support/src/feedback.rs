//! Test feedback sink: records every cue it receives.

use std::sync::Mutex;

use raffle_core::feedback::{FeedbackCue, FeedbackEvent, FeedbackSink};

/// A feedback sink that keeps every emitted cue in order.
#[derive(Debug, Default)]
pub struct RecordingFeedbackSink {
    cues: Mutex<Vec<FeedbackCue>>,
}

impl RecordingFeedbackSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded cues.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn cues(&self) -> Vec<FeedbackCue> {
        self.cues.lock().unwrap().clone()
    }

    /// Returns the recorded event kinds, in order.
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.cues().into_iter().map(|cue| cue.event).collect()
    }

    /// Returns how many cues of `event` were recorded.
    pub fn count(&self, event: FeedbackEvent) -> usize {
        self.events().into_iter().filter(|e| *e == event).count()
    }
}

impl FeedbackSink for RecordingFeedbackSink {
    fn emit(&self, cue: FeedbackCue) {
        self.cues.lock().unwrap().push(cue);
    }
}
