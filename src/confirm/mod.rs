// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Confirmation gate for slot mutations.
//!
//! Every `SET` is summarised as a [`ChangeDescription`], rendered into the
//! screen sequence the device shows, and handed to a [`ReviewUi`] that
//! answers with a single [`Decision`].

use std::collections::VecDeque;

use log::{info, warn};
use slot_apdu::{DerivationPath, SlotEntry, SlotIndex};

use crate::store::SlotState;

mod screens;

pub use screens::ReviewScreen;

/// Kind of change a `SET` applies to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Previously empty slot receives an entry.
    Create,
    /// Occupied slot receives a new entry.
    Update,
    /// Slot is overwritten with the zero sentinel.
    Delete,
}

impl ChangeKind {
    /// Verb shown on the first review screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "Set",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

/// Pending change presented to the device holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDescription {
    pub slot: SlotIndex,
    pub kind: ChangeKind,
    /// Entry being replaced, absent for empty slots.
    pub old: Option<SlotEntry>,
    /// Entry to be written; the zero sentinel for deletions.
    pub new: SlotEntry,
}

impl ChangeDescription {
    /// Classify a write of `new` over `previous`.
    pub fn classify(slot: SlotIndex, previous: SlotState, new: SlotEntry) -> Self {
        let old = previous.entry().copied();
        let kind = if new.is_sentinel() {
            ChangeKind::Delete
        } else if old.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Create
        };
        Self {
            slot,
            kind,
            old,
            new,
        }
    }
}

/// Holder's answer to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Commit the change.
    Approve,
    /// Drop the change and leave the slot as it was.
    Reject,
}

impl Decision {
    pub fn is_approved(self) -> bool {
        self == Self::Approve
    }
}

/// Review handed to the display collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub change: ChangeDescription,
    pub screens: Vec<ReviewScreen>,
}

/// Display and input collaborator that walks the holder through a review.
pub trait ReviewUi {
    /// Present `review` and block until the holder approves or rejects.
    fn review(&mut self, review: &Review) -> Decision;
}

impl<U: ReviewUi + ?Sized> ReviewUi for Box<U> {
    fn review(&mut self, review: &Review) -> Decision {
        (**self).review(review)
    }
}

/// Builds reviews for pending changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationGate {
    intro_screen: bool,
}

impl ConfirmationGate {
    /// Gate prefixing every review with a `Please review` screen when `intro_screen` is set.
    pub fn new(intro_screen: bool) -> Self {
        Self { intro_screen }
    }

    /// Render the review for `change`.
    pub fn prepare(&self, change: ChangeDescription) -> Review {
        info!(
            "review {} slot {} (old: {})",
            change.kind.label(),
            change.slot,
            if change.old.is_some() { "occupied" } else { "empty" }
        );
        Review {
            change,
            screens: screens::render(&change, self.intro_screen),
        }
    }
}

/// Review collaborator answering from a queue of scripted decisions.
///
/// Every review shown is recorded. Once the script runs dry each further
/// review is rejected.
#[derive(Debug, Default)]
pub struct ScriptedReview {
    decisions: VecDeque<Decision>,
    shown: Vec<Review>,
}

impl ScriptedReview {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
            shown: Vec::new(),
        }
    }

    /// Queue one more decision.
    pub fn push(&mut self, decision: Decision) {
        self.decisions.push_back(decision);
    }

    /// Reviews presented so far, oldest first.
    pub fn shown(&self) -> &[Review] {
        &self.shown
    }

    /// Decisions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl ReviewUi for ScriptedReview {
    fn review(&mut self, review: &Review) -> Decision {
        self.shown.push(review.clone());
        self.decisions.pop_front().unwrap_or_else(|| {
            warn!("no scripted decision left for slot {}", review.change.slot);
            Decision::Reject
        })
    }
}

/// Review collaborator that always answers the same way.
#[derive(Debug, Clone, Copy)]
pub struct AutoReview(pub Decision);

impl ReviewUi for AutoReview {
    fn review(&mut self, review: &Review) -> Decision {
        info!(
            "auto-{:?} {} slot {}",
            self.0,
            review.change.kind.label(),
            review.change.slot
        );
        self.0
    }
}

/// Path as shown on screen, without the `m/` prefix.
pub(crate) fn display_path(path: &DerivationPath) -> String {
    let text = path.to_string();
    text.strip_prefix("m/").map(str::to_owned).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slot_apdu::AccountId;

    fn entry(account: &str, path: &str) -> SlotEntry {
        SlotEntry::new(account.parse::<AccountId>().unwrap(), path.parse().unwrap())
    }

    #[test]
    fn classify_covers_every_kind() {
        let slot = SlotIndex::new(10);
        let a = entry("e467b9dd11fa00df", "m/44'/539'/513'/0/0");
        let b = entry("e467b9dd11fa00de", "m/44'/539'/513'/0/1");

        let create = ChangeDescription::classify(slot, SlotState::Empty, a);
        assert_eq!(create.kind, ChangeKind::Create);
        assert_eq!(create.old, None);

        let update = ChangeDescription::classify(slot, SlotState::Occupied(a), b);
        assert_eq!(update.kind, ChangeKind::Update);
        assert_eq!(update.old, Some(a));

        let same = ChangeDescription::classify(slot, SlotState::Occupied(a), a);
        assert_eq!(same.kind, ChangeKind::Update);

        let delete = ChangeDescription::classify(slot, SlotState::Occupied(a), SlotEntry::ZERO);
        assert_eq!(delete.kind, ChangeKind::Delete);
        assert_eq!(delete.old, Some(a));

        let delete_empty = ChangeDescription::classify(slot, SlotState::Empty, SlotEntry::ZERO);
        assert_eq!(delete_empty.kind, ChangeKind::Delete);
        assert_eq!(delete_empty.old, None);
    }

    #[test]
    fn scripted_review_rejects_when_exhausted() {
        let gate = ConfirmationGate::default();
        let change = ChangeDescription::classify(
            SlotIndex::new(1),
            SlotState::Empty,
            entry("0102030405060708", "m/44'/539'/513'/0/0"),
        );
        let review = gate.prepare(change);
        let mut ui = ScriptedReview::new([Decision::Approve]);
        assert_eq!(ui.review(&review), Decision::Approve);
        assert_eq!(ui.review(&review), Decision::Reject);
        assert_eq!(ui.shown().len(), 2);
        assert_eq!(ui.remaining(), 0);
    }

    #[test]
    fn display_path_drops_master_prefix() {
        let path: DerivationPath = "m/44'/539'/513'/0/0".parse().unwrap();
        assert_eq!(display_path(&path), "44'/539'/513'/0/0");
    }
}
