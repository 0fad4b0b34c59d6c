//! Participant registry operations on the session aggregate.
//!
//! Every operation here is rejected with `RaffleError::SessionLocked` once the
//! session is locked, and none of them touch the drawn list or the reveal.

use raffle_core::error::{RaffleError, ValidationError};
use raffle_core::name::normalize;

use super::aggregates::RaffleSession;

impl RaffleSession {
    fn ensure_unlocked(&self) -> Result<(), RaffleError> {
        if self.is_locked() {
            return Err(RaffleError::SessionLocked);
        }
        Ok(())
    }

    fn ensure_index(&self, index: usize) -> Result<(), RaffleError> {
        if index >= self.pending.len() {
            return Err(RaffleError::IndexOutOfRange {
                index,
                len: self.pending.len(),
            });
        }
        Ok(())
    }

    /// Trims `raw` and checks it against every registered name except the
    /// pending entry at `skip`.
    fn validate_name(&self, raw: &str, skip: Option<usize>) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        let key = normalize(trimmed);
        let pending = self
            .pending
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(_, name)| name);
        if pending.chain(self.drawn.iter()).any(|name| normalize(name) == key) {
            return Err(ValidationError::Duplicate);
        }
        Ok(trimmed.to_owned())
    }

    /// Appends a participant to the end of the pending list.
    ///
    /// The trimmed (not normalized) text is stored and returned.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::SessionLocked` if the session is locked, or
    /// `RaffleError::Validation` if the name is empty or already registered.
    pub fn add_participant(&mut self, raw: &str) -> Result<&str, RaffleError> {
        self.ensure_unlocked()?;
        let name = self.validate_name(raw, None)?;
        self.pending.push(name);
        Ok(self.pending.last().map_or("", String::as_str))
    }

    /// Marks the pending entry at `index` as being edited and returns its
    /// current text.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::SessionLocked` if the session is locked, or
    /// `RaffleError::IndexOutOfRange` for a bad index.
    pub fn begin_edit(&mut self, index: usize) -> Result<&str, RaffleError> {
        self.ensure_unlocked()?;
        self.ensure_index(index)?;
        self.editing = Some(index);
        Ok(&self.pending[index])
    }

    /// Drops the edit marker, if any.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Replaces the pending entry at `index`.
    ///
    /// The entry itself is excluded from the duplicate check, so re-casing a
    /// name is allowed. Clears the edit marker if it pointed at `index`.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::SessionLocked` if the session is locked,
    /// `RaffleError::IndexOutOfRange` for a bad index, or
    /// `RaffleError::Validation` if the new name is empty or taken.
    pub fn edit_participant(&mut self, index: usize, raw: &str) -> Result<(), RaffleError> {
        self.ensure_unlocked()?;
        self.ensure_index(index)?;
        let name = self.validate_name(raw, Some(index))?;
        self.pending[index] = name;
        if self.editing == Some(index) {
            self.editing = None;
        }
        Ok(())
    }

    /// Removes and returns the pending entry at `index`.
    ///
    /// Clears the edit marker if it pointed at `index`; a marker further down
    /// the list follows its entry.
    ///
    /// # Errors
    ///
    /// Returns `RaffleError::SessionLocked` if the session is locked, or
    /// `RaffleError::IndexOutOfRange` for a bad index.
    pub fn remove_participant(&mut self, index: usize) -> Result<String, RaffleError> {
        self.ensure_unlocked()?;
        self.ensure_index(index)?;
        let removed = self.pending.remove(index);
        self.editing = match self.editing {
            Some(editing) if editing == index => None,
            Some(editing) if editing > index => Some(editing - 1),
            other => other,
        };
        Ok(removed)
    }
}
