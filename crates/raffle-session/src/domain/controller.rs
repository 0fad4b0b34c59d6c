//! Session-level resets on the aggregate.

use raffle_core::error::RaffleError;
use raffle_core::feedback::SoundSettings;

use super::aggregates::{DrawPhase, RaffleSession};

impl RaffleSession {
    /// Returns every drawn name to the end of the pending list, in draw
    /// order, and unlocks the session.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::DrawInProgress` while rolling, or
    /// `RaffleError::NothingDrawn` when there is nothing to restart.
    pub fn restart_keeping_participants(&mut self) -> Result<(), RaffleError> {
        if self.is_rolling() {
            return Err(RaffleError::DrawInProgress);
        }
        if !self.has_drawn() {
            return Err(RaffleError::NothingDrawn);
        }
        self.pending.append(&mut self.drawn);
        self.current_reveal = None;
        self.editing = None;
        self.phase = DrawPhase::Idle;
        Ok(())
    }

    /// Wipes participants, results and sound preferences.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::DrawInProgress` while rolling.
    pub fn reset_for_new_session(&mut self) -> Result<(), RaffleError> {
        if self.is_rolling() {
            return Err(RaffleError::DrawInProgress);
        }
        *self = Self::new();
        Ok(())
    }

    /// Replaces the sound preferences. Allowed in every phase.
    pub fn update_sound(&mut self, settings: SoundSettings) {
        self.sound = SoundSettings::new(settings.enabled, settings.volume);
    }
}
