// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Encode and decode slot APDUs without std dependencies.
// Author: Lukas Bower

//! Encode/decode helpers for slot APDUs.

use alloc::vec::Vec;

use crate::types::*;

/// Encode/decode helper bound to one instruction class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    cla: u8,
}

impl Default for Codec {
    fn default() -> Self {
        Self { cla: CLA }
    }
}

impl Codec {
    /// Construct a codec accepting the supplied class byte.
    #[must_use]
    pub fn new(cla: u8) -> Self {
        Self { cla }
    }

    /// Class byte written and accepted by this codec.
    #[must_use]
    pub fn cla(&self) -> u8 {
        self.cla
    }

    /// Encode a request into its wire representation.
    #[must_use]
    pub fn encode_request(&self, request: &Request) -> Vec<u8> {
        let mut body = Vec::with_capacity(SET_BODY_LEN);
        match request {
            Request::SlotStatus => {}
            Request::GetSlot { slot } => body.push(slot.raw()),
            Request::SetSlot { slot, entry } => {
                body.push(slot.raw());
                body.extend_from_slice(&entry.to_wire());
            }
        }
        let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
        frame.push(self.cla);
        frame.push(request.instruction().into());
        frame.push(0);
        frame.push(0);
        // Bodies are at most SET_BODY_LEN bytes.
        frame.push(body.len() as u8);
        frame.extend_from_slice(&body);
        frame
    }

    /// Decode a request, rejecting anything that does not match the fixed layout.
    pub fn decode_request(&self, bytes: &[u8]) -> Result<Request, CodecError> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::Truncated);
        }
        if bytes[0] != self.cla {
            return Err(CodecError::ClassNotSupported(bytes[0]));
        }
        let instruction = Instruction::try_from(bytes[1])?;
        let (p1, p2) = (bytes[2], bytes[3]);
        if p1 != 0 || p2 != 0 {
            return Err(CodecError::InvalidParams { p1, p2 });
        }
        let declared = usize::from(bytes[4]);
        let body = &bytes[HEADER_LEN..];
        if declared != body.len() {
            return Err(CodecError::LengthMismatch {
                declared,
                actual: body.len(),
            });
        }
        if body.len() != instruction.body_len() {
            return Err(CodecError::BodyLength {
                instruction,
                expected: instruction.body_len(),
                actual: body.len(),
            });
        }
        Ok(match instruction {
            Instruction::SlotStatus => Request::SlotStatus,
            Instruction::GetSlot => Request::GetSlot {
                slot: SlotIndex::new(body[0]),
            },
            Instruction::SetSlot => {
                let mut entry = [0u8; ENTRY_LEN];
                entry.copy_from_slice(&body[1..]);
                Request::SetSlot {
                    slot: SlotIndex::new(body[0]),
                    entry: SlotEntry::from_wire(&entry),
                }
            }
        })
    }

    /// Encode a response. Payloads are only written alongside a success code.
    #[must_use]
    pub fn encode_response(&self, response: &Response) -> Vec<u8> {
        let mut frame = Vec::new();
        if response.code.is_success() {
            match &response.body {
                ResponseBody::Empty => {}
                ResponseBody::SlotStatus(flags) => {
                    frame.extend(flags.iter().map(|occupied| u8::from(*occupied)));
                }
                ResponseBody::Slot(entry) => frame.extend_from_slice(&entry.to_wire()),
            }
        }
        frame.extend_from_slice(&response.code.to_be_bytes());
        frame
    }

    /// Decode the response to `instruction`.
    pub fn decode_response(
        &self,
        instruction: Instruction,
        bytes: &[u8],
    ) -> Result<Response, CodecError> {
        let split = bytes
            .len()
            .checked_sub(RETURN_CODE_LEN)
            .ok_or(CodecError::Truncated)?;
        let (payload, trailer) = bytes.split_at(split);
        let code = ReturnCode::try_from(u16::from_be_bytes([trailer[0], trailer[1]]))?;
        if !code.is_success() {
            if !payload.is_empty() {
                return Err(CodecError::LengthMismatch {
                    declared: 0,
                    actual: payload.len(),
                });
            }
            return Ok(Response::status(code));
        }
        let body = match instruction {
            Instruction::SlotStatus => {
                let mut flags = Vec::with_capacity(payload.len());
                for byte in payload {
                    flags.push(match byte {
                        0 => false,
                        1 => true,
                        other => return Err(CodecError::InvalidStatusByte(*other)),
                    });
                }
                ResponseBody::SlotStatus(flags)
            }
            Instruction::GetSlot => {
                let entry: &[u8; ENTRY_LEN] =
                    payload
                        .try_into()
                        .map_err(|_| CodecError::LengthMismatch {
                            declared: ENTRY_LEN,
                            actual: payload.len(),
                        })?;
                ResponseBody::Slot(SlotEntry::from_wire(entry))
            }
            Instruction::SetSlot => {
                if !payload.is_empty() {
                    return Err(CodecError::LengthMismatch {
                        declared: 0,
                        actual: payload.len(),
                    });
                }
                ResponseBody::Empty
            }
        };
        Ok(Response { code, body })
    }
}

/// Encode a request using the default codec.
pub fn encode_request(req: &Request) -> Vec<u8> {
    Codec::default().encode_request(req)
}

/// Encode a response using the default codec.
pub fn encode_response(res: &Response) -> Vec<u8> {
    Codec::default().encode_response(res)
}

/// Decode a request using the default codec.
pub fn decode_request(bytes: &[u8]) -> Result<Request, CodecError> {
    Codec::default().decode_request(bytes)
}

/// Decode the response to `instruction` using the default codec.
pub fn decode_response(instruction: Instruction, bytes: &[u8]) -> Result<Response, CodecError> {
    Codec::default().decode_response(instruction, bytes)
}
