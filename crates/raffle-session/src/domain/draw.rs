//! Draw state machine on the session aggregate.
//!
//! `begin_draw` fixes the outcome immediately; `roll_tick` only refreshes the
//! displayed candidate; `commit_draw` is the single place where a name moves
//! from pending to drawn. Scheduling of ticks and the commit lives in the
//! application engine.

use chrono::{DateTime, Utc};
use raffle_core::clock::Clock;
use raffle_core::rng::DeterministicRng;
use tracing::error;
use uuid::Uuid;

use super::aggregates::{DrawPhase, RaffleSession, RollingDraw};

/// Receipt for a started draw. Does not reveal the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawTicket {
    /// Identifier of the started draw.
    pub draw_id: Uuid,
    /// When the draw was started.
    pub started_at: DateTime<Utc>,
}

impl RaffleSession {
    /// Starts a draw, selecting its outcome uniformly from the current
    /// pending list.
    ///
    /// Returns `None` without changing anything when a draw is already
    /// rolling or nobody is pending.
    pub fn begin_draw(
        &mut self,
        rng: &mut dyn DeterministicRng,
        clock: &dyn Clock,
    ) -> Option<DrawTicket> {
        if self.is_rolling() {
            return None;
        }
        let index = rng.pick_index(self.pending.len())?;
        let committed = self.pending[index].clone();
        let ticket = DrawTicket {
            draw_id: Uuid::now_v7(),
            started_at: clock.now(),
        };
        self.phase = DrawPhase::Rolling(RollingDraw {
            draw_id: ticket.draw_id,
            started_at: ticket.started_at,
            committed,
            displayed: self.pending[0].clone(),
        });
        Some(ticket)
    }

    /// Refreshes the displayed candidate with a random pending name.
    ///
    /// Returns the new candidate, or `None` when no draw is rolling.
    pub fn roll_tick(&mut self, rng: &mut dyn DeterministicRng) -> Option<&str> {
        let DrawPhase::Rolling(draw) = &mut self.phase else {
            return None;
        };
        let index = rng.pick_index(self.pending.len())?;
        draw.displayed.clone_from(&self.pending[index]);
        Some(draw.displayed.as_str())
    }

    /// Commits the rolling draw: moves the committed name from pending to
    /// drawn, sets it as the current reveal and clears the edit marker.
    ///
    /// Returns the revealed name, or `None` when no draw is rolling.
    pub fn commit_draw(&mut self) -> Option<String> {
        if !self.is_rolling() {
            return None;
        }
        let DrawPhase::Rolling(draw) = std::mem::replace(&mut self.phase, DrawPhase::Idle) else {
            return None;
        };
        let Some(index) = self.pending.iter().position(|name| *name == draw.committed) else {
            // Unreachable while the lock holds; leave the lists untouched.
            error!(draw_id = %draw.draw_id, "committed name vanished from pending list");
            self.phase = if self.current_reveal.is_some() {
                DrawPhase::Revealed
            } else {
                DrawPhase::Idle
            };
            return None;
        };
        let name = self.pending.remove(index);
        self.drawn.push(name.clone());
        self.current_reveal = Some(name.clone());
        self.editing = None;
        self.phase = DrawPhase::Revealed;
        Some(name)
    }
}
