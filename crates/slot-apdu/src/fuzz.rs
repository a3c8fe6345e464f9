// Author: Lukas Bower
// Purpose: Provide a fuzz corpus harness for slot APDU decoding.

//! Fuzz corpus harnesses for slot APDU decoding.

use crate::{Codec, Instruction};

/// Exercise every decoder path on arbitrary corpus bytes.
pub fn fuzz_decode(bytes: &[u8]) {
    let codec = Codec::default();
    let _ = codec.decode_request(bytes);
    for instruction in [
        Instruction::SlotStatus,
        Instruction::GetSlot,
        Instruction::SetSlot,
    ] {
        let _ = codec.decode_response(instruction, bytes);
    }
}
