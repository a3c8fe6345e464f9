// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Pin the slot APDU layouts to byte traces captured from a device session.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use slot_apdu::{
    decode_request, decode_response, encode_request, encode_response, AccountId, DerivationPath,
    Instruction, Request, Response, ResponseBody, ReturnCode, SlotEntry, SlotIndex, SLOT_COUNT,
};

const SCHEME_PATH: &str = "m/44'/539'/513'/0/0";

fn entry(account: &str, path: &str) -> SlotEntry {
    SlotEntry::new(account.parse().unwrap(), path.parse().unwrap())
}

#[test]
fn status_request_matches_trace() {
    assert_eq!(hex::encode(encode_request(&Request::SlotStatus)), "3310000000");
    assert_eq!(
        decode_request(&hex::decode("3310000000").unwrap()),
        Ok(Request::SlotStatus)
    );
}

#[test]
fn set_request_matches_trace() {
    let request = Request::SetSlot {
        slot: SlotIndex::new(10),
        entry: entry("e467b9dd11fa00df", SCHEME_PATH),
    };
    let expected = "331200001d0ae467b9dd11fa00df2c0000801b020080010200800000000000000000";
    assert_eq!(hex::encode(encode_request(&request)), expected);
    assert_eq!(decode_request(&hex::decode(expected).unwrap()), Ok(request));
}

#[test]
fn delete_request_is_all_zero_body() {
    let request = Request::SetSlot {
        slot: SlotIndex::new(10),
        entry: entry("0000000000000000", "m/0/0/0/0/0"),
    };
    let frame = encode_request(&request);
    assert_eq!(
        hex::encode(&frame),
        "331200001d0a00000000000000000000000000000000000000000000000000000000"
    );
    let Request::SetSlot { entry, .. } = decode_request(&frame).unwrap() else {
        panic!("expected set request");
    };
    assert!(entry.is_sentinel());
}

#[test]
fn get_request_matches_trace() {
    let request = Request::GetSlot {
        slot: SlotIndex::new(3),
    };
    assert_eq!(hex::encode(encode_request(&request)), "331100000103");
}

#[test]
fn status_response_is_one_byte_per_slot() {
    let mut flags = vec![false; SLOT_COUNT];
    flags[10] = true;
    let bytes = encode_response(&Response::ok(ResponseBody::SlotStatus(flags.clone())));
    assert_eq!(bytes.len(), SLOT_COUNT + 2);
    assert_eq!(bytes[10], 0x01);
    assert_eq!(&bytes[SLOT_COUNT..], &[0x90, 0x00]);
    let decoded = decode_response(Instruction::SlotStatus, &bytes).unwrap();
    assert_eq!(decoded.body, ResponseBody::SlotStatus(flags));
}

#[test]
fn get_response_matches_trace() {
    let expected = "e467b9dd11fa00de2c0000801b0200800102008000000000010000009000";
    let response = decode_response(Instruction::GetSlot, &hex::decode(expected).unwrap()).unwrap();
    assert_eq!(response.code, ReturnCode::Success);
    let ResponseBody::Slot(slot) = response.body else {
        panic!("expected slot payload");
    };
    assert_eq!(slot.account.to_string(), "e467b9dd11fa00de");
    assert_eq!(slot.path.to_string(), "m/44'/539'/513'/0/1");
    assert_eq!(
        hex::encode(encode_response(&Response::ok(ResponseBody::Slot(slot)))),
        expected
    );
}

#[test]
fn empty_slot_response_is_bare_status_word() {
    let response = decode_response(Instruction::GetSlot, &[0x69, 0x82]).unwrap();
    assert_eq!(response, Response::status(ReturnCode::EmptyBuffer));
    assert_eq!(response.code.message(), "Empty Buffer");
}

#[test]
fn return_code_vocabulary_is_closed() {
    for code in ReturnCode::ALL {
        assert_eq!(ReturnCode::try_from(code.as_u16()), Ok(code));
        assert!(!code.message().is_empty());
    }
    assert_eq!(ReturnCode::Success.message(), "No errors");
}

#[test]
fn path_text_round_trips_hardened_markers() {
    let path: DerivationPath = "m/44h/539'/1/0/7".parse().unwrap();
    assert_eq!(path.to_string(), "m/44'/539'/1/0/7");
    assert!("m/44'/539'/0/0".parse::<DerivationPath>().is_err());
    assert!("m/44'/539'/0/0/0/0".parse::<DerivationPath>().is_err());
    assert!("m/2147483648/0/0/0/0".parse::<DerivationPath>().is_err());
    assert!("zz".parse::<AccountId>().is_err());
    assert_eq!(
        "0xe467b9dd11fa00df".parse::<AccountId>().unwrap().to_string(),
        "e467b9dd11fa00df"
    );
}
