// CLASSIFICATION: COMMUNITY
// Filename: file_store.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use std::fs;

use slot_apdu::{AccountId, DerivationPath, ReturnCode, SlotEntry, SlotIndex};
use slotkeeper::store::file::{decode_image, encode_image};
use slotkeeper::{
    AutoReview, Decision, Dispatcher, FileSlotStore, InProcessTransport, SlotClient, SlotState,
    SlotStore, StoreError,
};
use tempfile::tempdir;

fn entry() -> SlotEntry {
    SlotEntry::new(
        "e467b9dd11fa00df".parse::<AccountId>().unwrap(),
        "m/44'/539'/513'/0/0".parse::<DerivationPath>().unwrap(),
    )
}

#[test]
fn open_creates_empty_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("slots.img");
    let store = FileSlotStore::open(&path, 64).unwrap();
    assert!(path.exists());
    assert_eq!(store.status(), vec![false; 64]);
    assert_eq!(decode_image(&fs::read(&path).unwrap()).unwrap().len(), 64);
}

#[test]
fn approved_writes_survive_reopen() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");

    let store = FileSlotStore::open(&path, 64).unwrap();
    let transport = InProcessTransport::new(Dispatcher::new(store), AutoReview(Decision::Approve));
    let mut client = SlotClient::new(transport);
    assert!(client.set_slot(10, entry().account, entry().path).unwrap().is_ok());
    assert!(client.set_slot(11, entry().account, entry().path).unwrap().is_ok());
    assert!(client.delete_slot(11).unwrap().is_ok());
    drop(client);

    let reopened = FileSlotStore::open(&path, 64).unwrap();
    assert_eq!(reopened.get(SlotIndex::new(10)).unwrap(), entry());
    assert!(matches!(
        reopened.get(SlotIndex::new(11)),
        Err(StoreError::EmptySlot(_))
    ));
    assert!(!dir.path().join("slots.img.tmp").exists());
}

#[test]
fn rejected_writes_never_reach_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");
    let before = {
        FileSlotStore::open(&path, 8).unwrap();
        fs::read(&path).unwrap()
    };
    let transport = InProcessTransport::new(
        Dispatcher::new(FileSlotStore::open(&path, 8).unwrap()),
        AutoReview(Decision::Reject),
    );
    let mut client = SlotClient::new(transport);
    assert!(!client.set_slot(2, entry().account, entry().path).unwrap().is_ok());
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn tampered_image_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");
    let mut slots = vec![SlotState::Empty; 4];
    slots[0] = SlotState::Occupied(entry());
    let mut image = encode_image(&slots).unwrap();
    image[10] ^= 0xff;
    fs::write(&path, &image).unwrap();
    assert!(matches!(
        FileSlotStore::open(&path, 4),
        Err(StoreError::Corrupt(_))
    ));
}

#[test]
fn capacity_mismatch_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");
    FileSlotStore::open(&path, 4).unwrap();
    assert!(matches!(
        FileSlotStore::open(&path, 64),
        Err(StoreError::Corrupt(_))
    ));
}

#[test]
fn failed_persist_keeps_memory_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");
    let mut store = FileSlotStore::open(&path, 4).unwrap();
    // A directory in place of the temp file makes the next write fail.
    fs::create_dir(dir.path().join("slots.img.tmp")).unwrap();
    let result = store.set(SlotIndex::new(1), entry());
    assert!(matches!(result, Err(StoreError::Io(_))));
    assert_eq!(store.read(SlotIndex::new(1)), Some(SlotState::Empty));
}

#[test]
fn failed_persist_after_approval_answers_execution_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");
    let store = FileSlotStore::open(&path, 64).unwrap();
    let before = fs::read(&path).unwrap();
    fs::create_dir(dir.path().join("slots.img.tmp")).unwrap();

    let transport = InProcessTransport::new(Dispatcher::new(store), AutoReview(Decision::Approve));
    let mut client = SlotClient::new(transport);
    let reply = client.set_slot(3, entry().account, entry().path).unwrap();
    assert_eq!(reply.return_code, ReturnCode::ExecutionError);
    assert_eq!(reply.error_message(), "Execution Error");

    let flags = client.slot_status().unwrap().value.unwrap();
    assert_eq!(flags, vec![false; 64]);
    assert_eq!(
        client.get_slot(3).unwrap().return_code,
        ReturnCode::EmptyBuffer
    );
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn oversized_table_is_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("slots.img");
    assert!(matches!(
        FileSlotStore::open(&path, 300),
        Err(StoreError::Capacity(300))
    ));
    assert!(!path.exists());
    assert_eq!(FileSlotStore::open(&path, 256).unwrap().capacity(), 256);
}
