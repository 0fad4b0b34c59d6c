//! The raffle session aggregate.

use chrono::{DateTime, Utc};
use raffle_core::feedback::SoundSettings;
use uuid::Uuid;

/// A draw that has been committed to an outcome but not yet revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingDraw {
    /// Identifier used to correlate the draw across logs and views.
    pub draw_id: Uuid,
    /// When the draw was started.
    pub started_at: DateTime<Utc>,
    /// The outcome fixed at draw time. Hidden until the commit.
    pub(crate) committed: String,
    /// The cosmetic candidate currently on display.
    pub(crate) displayed: String,
}

impl RollingDraw {
    /// The name currently on display. Carries no information about the outcome.
    #[must_use]
    pub fn displayed(&self) -> &str {
        &self.displayed
    }
}

/// Draw state machine phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawPhase {
    /// Nothing in flight and nothing revealed.
    Idle,
    /// A draw is animating towards its committed outcome.
    Rolling(RollingDraw),
    /// The last draw has been committed and revealed.
    Revealed,
}

/// The aggregate root for one raffle session.
///
/// Owns the pending and drawn lists, the current reveal, the edit marker,
/// the draw phase and the sound settings. Invariants:
/// - normalized keys across `pending` and `drawn` are unique;
/// - `current_reveal`, when set by a draw, is the last element of `drawn`;
/// - a draw moves exactly one name from `pending` to `drawn`.
#[derive(Debug, Clone)]
pub struct RaffleSession {
    pub(crate) pending: Vec<String>,
    pub(crate) drawn: Vec<String>,
    pub(crate) current_reveal: Option<String>,
    pub(crate) editing: Option<usize>,
    pub(crate) phase: DrawPhase,
    pub(crate) sound: SoundSettings,
}

impl Default for RaffleSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RaffleSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            drawn: Vec::new(),
            current_reveal: None,
            editing: None,
            phase: DrawPhase::Idle,
            sound: SoundSettings::default(),
        }
    }

    /// Restores a session from persisted pieces.
    ///
    /// An empty reveal string counts as no reveal. A restored reveal puts the
    /// engine in `Revealed`; otherwise it starts `Idle`.
    #[must_use]
    pub fn restore(
        pending: Vec<String>,
        drawn: Vec<String>,
        current_reveal: Option<String>,
        sound: SoundSettings,
    ) -> Self {
        let current_reveal = current_reveal.filter(|name| !name.is_empty());
        let phase = if current_reveal.is_some() {
            DrawPhase::Revealed
        } else {
            DrawPhase::Idle
        };
        Self {
            pending,
            drawn,
            current_reveal,
            editing: None,
            phase,
            sound,
        }
    }

    /// Names awaiting the draw, in display order.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Names already drawn, oldest first.
    #[must_use]
    pub fn drawn(&self) -> &[String] {
        &self.drawn
    }

    /// The most recently revealed name.
    #[must_use]
    pub fn current_reveal(&self) -> Option<&str> {
        self.current_reveal.as_deref()
    }

    /// Index of the pending entry being edited, if any.
    #[must_use]
    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    /// Current draw phase.
    #[must_use]
    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    /// Current sound settings.
    #[must_use]
    pub fn sound(&self) -> SoundSettings {
        self.sound
    }

    /// The in-flight draw, if the engine is rolling.
    #[must_use]
    pub fn rolling(&self) -> Option<&RollingDraw> {
        match &self.phase {
            DrawPhase::Rolling(draw) => Some(draw),
            _ => None,
        }
    }

    /// Returns `true` while a draw is animating.
    #[must_use]
    pub fn is_rolling(&self) -> bool {
        self.rolling().is_some()
    }

    /// Returns `true` once anything has been drawn in this session.
    #[must_use]
    pub fn has_drawn(&self) -> bool {
        !self.drawn.is_empty() || self.current_reveal.is_some()
    }

    /// Returns `true` when the participant list may not be changed.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.has_drawn() || self.is_rolling()
    }

    /// The name a presentation layer should show: the rolling candidate while
    /// a draw is animating, otherwise the current reveal.
    #[must_use]
    pub fn displayed_name(&self) -> Option<&str> {
        match &self.phase {
            DrawPhase::Rolling(draw) => Some(draw.displayed()),
            _ => self.current_reveal(),
        }
    }

    /// Total participants accounted for in this session.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.pending.len() + self.drawn.len()
    }
}
