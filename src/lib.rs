// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Slot table application.
//!
//! A device keeps a fixed table of slots, each binding an 8-byte account to
//! a five-component derivation path. Hosts talk to it with three APDUs:
//! `STATUS`, `GET` and `SET`. Every `SET` is held until the device holder
//! approves the change on a review, and only then reaches the store.
//!
//! The wire format lives in the `slot-apdu` crate; this crate holds the
//! store, the confirmation gate, the dispatcher, the host client and the
//! `slotkeeper` command line.

pub mod cli;
pub mod config;
pub mod confirm;
pub mod dispatcher;
pub mod store;
pub mod transport;

pub use config::{Config, ConfigError};
pub use confirm::{
    AutoReview, ChangeDescription, ChangeKind, ConfirmationGate, Decision, Review, ReviewScreen,
    ReviewUi, ScriptedReview,
};
pub use dispatcher::{DispatchError, Dispatcher, DispatcherState, Phase, Step};
pub use store::{FileSlotStore, MemorySlotStore, SlotState, SlotStore, StoreError};
pub use transport::{
    InProcessTransport, RecordingTransport, Reply, SlotClient, Transport, TransportError,
};
