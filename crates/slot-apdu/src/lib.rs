// Author: Lukas Bower
// Purpose: Provide slot APDU wire types and codec primitives for device and host code.
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![no_std]

//! Slot APDU wire types and codec primitives shared by the slotkeeper device
//! handler and host-side clients. Requests use the fixed
//! `[cla][ins][p1][p2][len][body]` layout; every response ends with a
//! big-endian two-byte return code.

extern crate alloc;

#[cfg(test)]
extern crate std;

mod codec;
mod fuzz;
mod types;

pub use codec::{decode_request, decode_response, encode_request, encode_response, Codec};
pub use fuzz::fuzz_decode;
pub use types::*;
