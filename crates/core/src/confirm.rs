//! Two-step delete confirmation, tracked per entry.
//!
//! Only entries in the `Confirming` phase are stored; every other id is
//! implicitly `Idle`. Committing a confirmation removes it whether or not the
//! resulting delete succeeds, so a failed delete never leaves a row stuck in
//! `Confirming`.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::entry::EntryId;

/// Confirmation phase of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmPhase {
    Idle,
    Confirming,
}

/// Per-entry delete confirmation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConfirmations {
    confirming: BTreeSet<EntryId>,
}

impl DeleteConfirmations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self, id: EntryId) -> ConfirmPhase {
        if self.confirming.contains(&id) {
            ConfirmPhase::Confirming
        } else {
            ConfirmPhase::Idle
        }
    }

    /// `Idle -> Confirming`. Pressing Delete again while confirming is a no-op.
    pub fn press_delete(&mut self, id: EntryId) -> ConfirmPhase {
        self.confirming.insert(id);
        ConfirmPhase::Confirming
    }

    /// `Confirming -> Idle`. Returns true if the entry was confirming.
    pub fn cancel(&mut self, id: EntryId) -> bool {
        self.confirming.remove(&id)
    }

    /// Commits a pending confirmation.
    ///
    /// Returns the id to delete when the entry was confirming, `None`
    /// otherwise. Either way the entry ends up `Idle`.
    pub fn confirm(&mut self, id: EntryId) -> Option<EntryId> {
        self.confirming.remove(&id).then_some(id)
    }

    /// Ids currently awaiting confirmation, in ascending order.
    pub fn confirming(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.confirming.iter().copied()
    }
}
