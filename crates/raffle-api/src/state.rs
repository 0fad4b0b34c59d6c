//! Shared application state.

use raffle_session::application::engine::SessionHandle;

use crate::feedback::BroadcastFeedbackSink;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the running session engine.
    pub session: SessionHandle,
    /// Source of feedback cues for the event stream.
    pub feedback: BroadcastFeedbackSink,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(session: SessionHandle, feedback: BroadcastFeedbackSink) -> Self {
        Self { session, feedback }
    }
}
