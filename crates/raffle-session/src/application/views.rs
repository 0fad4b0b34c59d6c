//! Read-only views of the session for presentation layers.

use chrono::{DateTime, Utc};
use raffle_core::feedback::SoundSettings;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{DrawPhase, RaffleSession};

/// Draw phase as seen by a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseView {
    /// Nothing in flight, nothing revealed.
    Idle,
    /// A draw is animating.
    Rolling,
    /// The last draw has been revealed.
    Revealed,
}

/// Snapshot of the whole session.
///
/// The committed outcome of a rolling draw is intentionally absent; only the
/// cosmetic candidate is exposed until the commit.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Names awaiting the draw, in display order.
    pub pending: Vec<String>,
    /// Names already drawn, oldest first.
    pub drawn: Vec<String>,
    /// The most recent reveal.
    pub current_reveal: Option<String>,
    /// What to show in the reveal card right now.
    pub displayed_name: Option<String>,
    /// Draw phase.
    pub phase: PhaseView,
    /// Identifier of the rolling draw.
    pub draw_id: Option<Uuid>,
    /// Start time of the rolling draw.
    pub rolling_started_at: Option<DateTime<Utc>>,
    /// Whether the participant list is locked.
    pub locked: bool,
    /// Whether anything has been drawn this session.
    pub has_drawn: bool,
    /// Number of names still pending.
    pub names_left: usize,
    /// Index of the pending entry being edited.
    pub editing_index: Option<usize>,
    /// Sound preferences.
    pub sound: SoundSettings,
}

impl From<&RaffleSession> for SessionView {
    fn from(session: &RaffleSession) -> Self {
        let rolling = session.rolling();
        let phase = match session.phase() {
            DrawPhase::Idle => PhaseView::Idle,
            DrawPhase::Rolling(_) => PhaseView::Rolling,
            DrawPhase::Revealed => PhaseView::Revealed,
        };
        Self {
            pending: session.pending().to_vec(),
            drawn: session.drawn().to_vec(),
            current_reveal: session.current_reveal().map(str::to_owned),
            displayed_name: session.displayed_name().map(str::to_owned),
            phase,
            draw_id: rolling.map(|draw| draw.draw_id),
            rolling_started_at: rolling.map(|draw| draw.started_at),
            locked: session.is_locked(),
            has_drawn: session.has_drawn(),
            names_left: session.pending().len(),
            editing_index: session.editing(),
            sound: session.sound(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raffle_test_support::{FixedClock, SequenceRng};

    #[test]
    fn test_view_of_rolling_session_hides_outcome() {
        let mut session = RaffleSession::new();
        session.add_participant("Ana").unwrap();
        session.add_participant("Bea").unwrap();
        let clock = FixedClock::standard();
        let ticket = session
            .begin_draw(&mut SequenceRng::new(vec![1]), &clock)
            .unwrap();

        let view = SessionView::from(&session);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(view.phase, PhaseView::Rolling);
        assert_eq!(view.draw_id, Some(ticket.draw_id));
        assert_eq!(view.rolling_started_at, Some(clock.0));
        assert_eq!(view.displayed_name.as_deref(), Some("Ana"));
        assert!(view.locked);
        assert!(!view.has_drawn);
        assert!(json.get("committed").is_none());
        assert_eq!(json["phase"], "rolling");
    }

    #[test]
    fn test_view_of_revealed_session() {
        let session = RaffleSession::restore(
            vec!["Ana".to_owned()],
            vec!["Bea".to_owned()],
            Some("Bea".to_owned()),
            SoundSettings::default(),
        );

        let view = SessionView::from(&session);

        assert_eq!(view.phase, PhaseView::Revealed);
        assert_eq!(view.displayed_name.as_deref(), Some("Bea"));
        assert_eq!(view.names_left, 1);
        assert!(view.has_drawn);
        assert_eq!(view.draw_id, None);
    }
}
