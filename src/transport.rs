// CLASSIFICATION: COMMUNITY
// Filename: transport.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Request/response channel to the slot application and the host-side client.

use std::collections::VecDeque;

use log::debug;
use slot_apdu::{
    AccountId, Codec, CodecError, DerivationPath, Instruction, Request, ResponseBody, ReturnCode,
    SlotEntry, SlotIndex,
};
use thiserror::Error;

use crate::confirm::ReviewUi;
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::store::SlotStore;

/// Errors raised while exchanging APDUs.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Dispatcher refused the exchange.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    /// Response bytes could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// Instruction answered with a payload of the wrong shape.
    #[error("unexpected response body for {0:?}")]
    UnexpectedBody(Instruction),
}

/// Single-outstanding-request APDU channel.
pub trait Transport {
    /// Send one command and wait for its response.
    fn exchange(&mut self, apdu: &[u8]) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn exchange(&mut self, apdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        (**self).exchange(apdu)
    }
}

/// Transport delivering APDUs straight to an in-process dispatcher.
#[derive(Debug)]
pub struct InProcessTransport<S, U> {
    dispatcher: Dispatcher<S>,
    ui: U,
}

impl<S: SlotStore, U: ReviewUi> InProcessTransport<S, U> {
    pub fn new(dispatcher: Dispatcher<S>, ui: U) -> Self {
        Self { dispatcher, ui }
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn into_parts(self) -> (Dispatcher<S>, U) {
        (self.dispatcher, self.ui)
    }
}

impl<S: SlotStore, U: ReviewUi> Transport for InProcessTransport<S, U> {
    fn exchange(&mut self, apdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        Ok(self.dispatcher.process(apdu, &mut self.ui)?)
    }
}

/// Transport wrapper recording the hex of every command and response.
#[derive(Debug)]
pub struct RecordingTransport<T> {
    inner: T,
    commands_out: VecDeque<String>,
    responses_in: VecDeque<String>,
}

impl<T: Transport> RecordingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            commands_out: VecDeque::new(),
            responses_in: VecDeque::new(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Number of recorded commands not yet taken.
    pub fn commands_pending(&self) -> usize {
        self.commands_out.len()
    }

    /// Number of recorded responses not yet taken.
    pub fn responses_pending(&self) -> usize {
        self.responses_in.len()
    }

    /// Oldest recorded command, as lowercase hex.
    pub fn take_command(&mut self) -> Option<String> {
        self.commands_out.pop_front()
    }

    /// Oldest recorded response, as lowercase hex.
    pub fn take_response(&mut self) -> Option<String> {
        self.responses_in.pop_front()
    }
}

impl<T: Transport> Transport for RecordingTransport<T> {
    fn exchange(&mut self, apdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        let command = hex::encode(apdu);
        debug!("=> {command}");
        self.commands_out.push_back(command);
        let response = self.inner.exchange(apdu)?;
        let encoded = hex::encode(&response);
        debug!("<= {encoded}");
        self.responses_in.push_back(encoded);
        Ok(response)
    }
}

/// Decoded reply to a client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<T> {
    pub return_code: ReturnCode,
    /// Payload, present only on success.
    pub value: Option<T>,
}

impl<T> Reply<T> {
    pub fn is_ok(&self) -> bool {
        self.return_code.is_success()
    }

    /// Host-facing message for the return code.
    pub fn error_message(&self) -> &'static str {
        self.return_code.message()
    }
}

/// Host-side client speaking the slot protocol over any transport.
#[derive(Debug)]
pub struct SlotClient<T> {
    transport: T,
    codec: Codec,
}

impl<T: Transport> SlotClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_codec(transport, Codec::default())
    }

    pub fn with_codec(transport: T, codec: Codec) -> Self {
        Self { transport, codec }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Occupancy flag of every slot.
    pub fn slot_status(&mut self) -> Result<Reply<Vec<bool>>, TransportError> {
        self.call(&Request::SlotStatus, |body| match body {
            ResponseBody::SlotStatus(flags) => Some(flags),
            _ => None,
        })
    }

    /// Entry stored in `slot`.
    pub fn get_slot(&mut self, slot: u8) -> Result<Reply<SlotEntry>, TransportError> {
        let request = Request::GetSlot {
            slot: SlotIndex::new(slot),
        };
        self.call(&request, |body| match body {
            ResponseBody::Slot(entry) => Some(entry),
            _ => None,
        })
    }

    /// Bind `slot` to `account` and `path`; blocks while the device holder reviews.
    pub fn set_slot(
        &mut self,
        slot: u8,
        account: AccountId,
        path: DerivationPath,
    ) -> Result<Reply<()>, TransportError> {
        let request = Request::SetSlot {
            slot: SlotIndex::new(slot),
            entry: SlotEntry::new(account, path),
        };
        self.call(&request, |body| match body {
            ResponseBody::Empty => Some(()),
            _ => None,
        })
    }

    /// Clear `slot` by writing the zero entry.
    pub fn delete_slot(&mut self, slot: u8) -> Result<Reply<()>, TransportError> {
        self.set_slot(slot, AccountId::ZERO, DerivationPath::ZERO)
    }

    fn call<V>(
        &mut self,
        request: &Request,
        extract: impl FnOnce(ResponseBody) -> Option<V>,
    ) -> Result<Reply<V>, TransportError> {
        let instruction = request.instruction();
        let bytes = self.transport.exchange(&self.codec.encode_request(request))?;
        let response = self.codec.decode_response(instruction, &bytes)?;
        if !response.code.is_success() {
            return Ok(Reply {
                return_code: response.code,
                value: None,
            });
        }
        let value = extract(response.body).ok_or(TransportError::UnexpectedBody(instruction))?;
        Ok(Reply {
            return_code: response.code,
            value: Some(value),
        })
    }
}
