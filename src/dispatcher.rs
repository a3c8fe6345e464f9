// CLASSIFICATION: COMMUNITY
// Filename: dispatcher.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Slot command dispatcher.
//!
//! One command is in flight at a time. `STATUS` and `GET` complete inside
//! [`Dispatcher::begin`]; `SET` suspends in
//! [`DispatcherState::AwaitingConfirmation`] until [`Dispatcher::resume`]
//! delivers the holder's decision. The store is only written after an
//! approval, and every response ends in exactly one return code.

use std::mem;

use log::{debug, error, info, warn};
use slot_apdu::{Codec, Request, Response, ResponseBody, ReturnCode};
use thiserror::Error;

use crate::confirm::{ChangeDescription, ConfirmationGate, Decision, Review, ReviewUi};
use crate::store::{SlotStore, StoreError};

/// Processing phases a command passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Decoding,
    Routing,
    Rejected,
    Confirming,
    Executing,
    Encoding,
}

/// Resting state between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatcherState {
    /// Ready for the next command.
    #[default]
    Idle,
    /// A `SET` is waiting for the holder's decision.
    AwaitingConfirmation(ChangeDescription),
}

/// Outcome of [`Dispatcher::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Encoded response, ready to send.
    Complete(Vec<u8>),
    /// The command needs the review answered through [`Dispatcher::resume`].
    AwaitingConfirmation(Review),
}

/// Caller contract violations. Protocol failures are answered with return codes instead.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// A command arrived while a confirmation was pending.
    #[error("confirmation pending for slot {0}")]
    Busy(slot_apdu::SlotIndex),
    /// A decision arrived with no confirmation pending.
    #[error("no confirmation pending")]
    NothingPending,
}

/// Top-level command state machine, sole mutator of its store.
#[derive(Debug)]
pub struct Dispatcher<S> {
    store: S,
    codec: Codec,
    gate: ConfirmationGate,
    state: DispatcherState,
    trace: Vec<Phase>,
}

impl<S: SlotStore> Dispatcher<S> {
    /// Dispatcher for the default class byte without an intro screen.
    pub fn new(store: S) -> Self {
        Self::with_options(store, Codec::default(), ConfirmationGate::default())
    }

    /// Dispatcher with an explicit class byte and review gate.
    pub fn with_options(store: S, codec: Codec, gate: ConfirmationGate) -> Self {
        Self {
            store,
            codec,
            gate,
            state: DispatcherState::Idle,
            trace: Vec::new(),
        }
    }

    /// Current resting state.
    pub fn state(&self) -> &DispatcherState {
        &self.state
    }

    /// Read-only view of the slot table.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Phases walked by the most recent command.
    pub fn trace(&self) -> &[Phase] {
        &self.trace
    }

    /// Decode and route one command.
    pub fn begin(&mut self, apdu: &[u8]) -> Result<Step, DispatchError> {
        if let DispatcherState::AwaitingConfirmation(pending) = &self.state {
            warn!("apdu refused: slot {} awaits confirmation", pending.slot);
            return Err(DispatchError::Busy(pending.slot));
        }
        self.trace.clear();
        self.enter(Phase::Decoding);
        let request = match self.codec.decode_request(apdu) {
            Ok(request) => request,
            Err(err) => {
                warn!("rejected apdu: {err}");
                self.enter(Phase::Rejected);
                return Ok(Step::Complete(
                    self.finish(Response::status(err.return_code())),
                ));
            }
        };
        self.enter(Phase::Routing);
        debug!("routing {:?}", request.instruction());
        match request {
            Request::SlotStatus => {
                self.enter(Phase::Executing);
                let flags = self.store.status();
                Ok(Step::Complete(
                    self.finish(Response::ok(ResponseBody::SlotStatus(flags))),
                ))
            }
            Request::GetSlot { slot } => {
                self.enter(Phase::Executing);
                let response = match self.store.get(slot) {
                    Ok(entry) => Response::ok(ResponseBody::Slot(entry)),
                    Err(err) => {
                        debug!("get slot {slot}: {err}");
                        Response::status(return_code_for(&err))
                    }
                };
                Ok(Step::Complete(self.finish(response)))
            }
            Request::SetSlot { slot, entry } => {
                let Some(previous) = self.store.read(slot) else {
                    warn!(
                        "set slot {slot} outside table of {}",
                        self.store.capacity()
                    );
                    self.enter(Phase::Rejected);
                    return Ok(Step::Complete(
                        self.finish(Response::status(ReturnCode::DataInvalid)),
                    ));
                };
                let change = ChangeDescription::classify(slot, previous, entry);
                let review = self.gate.prepare(change);
                self.enter(Phase::Confirming);
                self.state = DispatcherState::AwaitingConfirmation(change);
                Ok(Step::AwaitingConfirmation(review))
            }
        }
    }

    /// Deliver the holder's decision for the pending `SET`.
    pub fn resume(&mut self, decision: Decision) -> Result<Vec<u8>, DispatchError> {
        let change = match mem::take(&mut self.state) {
            DispatcherState::AwaitingConfirmation(change) => change,
            DispatcherState::Idle => return Err(DispatchError::NothingPending),
        };
        if !decision.is_approved() {
            info!("slot {} {} rejected by holder", change.slot, change.kind.label());
            return Ok(self.finish(Response::status(ReturnCode::CommandNotAllowed)));
        }
        self.enter(Phase::Executing);
        let code = match self.store.set(change.slot, change.new) {
            Ok(_) => {
                info!("slot {} {} committed", change.slot, change.kind.label());
                ReturnCode::Success
            }
            Err(err) => {
                error!("slot {} write failed after approval: {err}", change.slot);
                match err {
                    // Range was checked while routing.
                    StoreError::InvalidIndex { .. } => ReturnCode::ExecutionError,
                    other => return_code_for(&other),
                }
            }
        };
        Ok(self.finish(Response::status(code)))
    }

    /// Run one command to completion, asking `ui` when confirmation is needed.
    pub fn process(&mut self, apdu: &[u8], ui: &mut dyn ReviewUi) -> Result<Vec<u8>, DispatchError> {
        match self.begin(apdu)? {
            Step::Complete(response) => Ok(response),
            Step::AwaitingConfirmation(review) => {
                let decision = ui.review(&review);
                self.resume(decision)
            }
        }
    }

    fn finish(&mut self, response: Response) -> Vec<u8> {
        self.enter(Phase::Encoding);
        let bytes = self.codec.encode_response(&response);
        debug!("response {} ({} bytes)", response.code, bytes.len());
        self.enter(Phase::Idle);
        bytes
    }

    fn enter(&mut self, phase: Phase) {
        self.trace.push(phase);
    }
}

fn return_code_for(err: &StoreError) -> ReturnCode {
    match err {
        StoreError::EmptySlot(_) => ReturnCode::EmptyBuffer,
        StoreError::InvalidIndex { .. } => ReturnCode::DataInvalid,
        StoreError::Io(_) | StoreError::Corrupt(_) | StoreError::Capacity(_) => {
            ReturnCode::ExecutionError
        }
    }
}
