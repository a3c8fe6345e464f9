// CLASSIFICATION: COMMUNITY
// Filename: screens.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Screen sequences for slot reviews.

use super::{display_path, ChangeDescription, ChangeKind};

/// One title/value page of a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewScreen {
    pub title: String,
    pub value: String,
}

impl ReviewScreen {
    fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

pub(super) fn render(change: &ChangeDescription, intro: bool) -> Vec<ReviewScreen> {
    let mut screens = Vec::with_capacity(6);
    if intro {
        screens.push(ReviewScreen::new("Please", "review"));
    }
    screens.push(ReviewScreen::new(
        format!("{} Account", change.kind.label()),
        change.slot.to_string(),
    ));
    match change.kind {
        ChangeKind::Create => {
            screens.push(ReviewScreen::new("Account", change.new.account.to_string()));
            screens.push(ReviewScreen::new("Path", display_path(&change.new.path)));
        }
        ChangeKind::Update | ChangeKind::Delete => {
            if let Some(old) = change.old {
                screens.push(ReviewScreen::new("Old Account", old.account.to_string()));
                screens.push(ReviewScreen::new("Old Path", display_path(&old.path)));
            }
            if change.kind == ChangeKind::Update {
                screens.push(ReviewScreen::new("New Account", change.new.account.to_string()));
                screens.push(ReviewScreen::new("New Path", display_path(&change.new.path)));
            }
        }
    }
    screens
}
