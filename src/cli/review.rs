// CLASSIFICATION: COMMUNITY
// Filename: review.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Terminal confirmation prompt.

use std::io::{BufRead, Write};

use log::warn;

use crate::confirm::{Decision, Review, ReviewUi};

/// Review collaborator printing each screen and reading a `y/N` answer.
///
/// Anything other than `y` or `yes`, including end of input, rejects.
pub struct TerminalReview<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalReview<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, review: &Review) -> std::io::Result<Decision> {
        for screen in &review.screens {
            writeln!(self.output, "{:>12}: {}", screen.title, screen.value)?;
        }
        write!(self.output, "Approve? [y/N] ")?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Decision::Approve,
            _ => Decision::Reject,
        })
    }
}

impl<R: BufRead, W: Write> ReviewUi for TerminalReview<R, W> {
    fn review(&mut self, review: &Review) -> Decision {
        self.ask(review).unwrap_or_else(|err| {
            warn!("review prompt failed: {err}");
            Decision::Reject
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{ChangeDescription, ConfirmationGate};
    use crate::store::SlotState;
    use slot_apdu::{AccountId, DerivationPath, SlotEntry, SlotIndex};

    fn review() -> Review {
        let entry = SlotEntry::new(
            AccountId::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]),
            DerivationPath::new([0x8000_002c, 0x8000_021b, 0x8000_0201, 0, 0]),
        );
        let change = ChangeDescription::classify(SlotIndex::new(4), SlotState::Empty, entry);
        ConfirmationGate::default().prepare(change)
    }

    #[test]
    fn yes_approves_and_screens_are_printed() {
        let mut out = Vec::new();
        let mut ui = TerminalReview::new(&b"y\n"[..], &mut out);
        assert_eq!(ui.review(&review()), Decision::Approve);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Set Account: 4"));
        assert!(text.contains("Account: 0102030405060708"));
        assert!(text.contains("Path: 44'/539'/513'/0/0"));
    }

    #[test]
    fn blank_or_closed_input_rejects() {
        for input in [&b"\n"[..], &b""[..], &b"nope\n"[..]] {
            let mut ui = TerminalReview::new(input, std::io::sink());
            assert_eq!(ui.review(&review()), Decision::Reject);
        }
    }
}
