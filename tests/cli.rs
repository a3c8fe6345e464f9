// CLASSIFICATION: COMMUNITY
// Filename: cli.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

use clap::Parser;
use serial_test::serial;
use slotkeeper::cli::{execute, Cli};
use slotkeeper::{AutoReview, Decision, ScriptedReview};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(store: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["slotkeeper", "--store", store.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv)?;
    let mut out = Vec::new();
    execute(cli, AutoReview(Decision::Approve), &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
#[serial]
fn set_get_delete_through_image_file() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("slots.img");

    let out = run(&store, &["set", "10", "e467b9dd11fa00df", "m/44'/539'/513'/0/0"]).unwrap();
    assert_eq!(out, "slot 10 set to e467b9dd11fa00df m/44'/539'/513'/0/0\n");

    let out = run(&store, &["get", "10"]).unwrap();
    assert_eq!(out, "slot 10: e467b9dd11fa00df m/44'/539'/513'/0/0\n");

    let out = run(&store, &["get", "10", "--json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["account"], "e467b9dd11fa00df");
    assert_eq!(value["path"], "m/44'/539'/513'/0/0");

    let out = run(&store, &["status", "--json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["occupied"], serde_json::json!([10]));
    assert_eq!(value["slots"].as_array().unwrap().len(), 64);

    run(&store, &["delete", "10"]).unwrap();
    let err = run(&store, &["get", "10"]).unwrap_err();
    assert!(err.to_string().contains("0x6982"), "{err:#}");
}

#[test]
#[serial]
fn rejected_set_is_an_error() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("slots.img");
    let cli = Cli::try_parse_from([
        "slotkeeper",
        "--store",
        store.to_str().unwrap(),
        "set",
        "1",
        "0102030405060708",
        "m/44'/539'/513'/0/0",
    ])
    .unwrap();
    let mut out = Vec::new();
    let err = execute(cli, ScriptedReview::new([Decision::Reject]), &mut out).unwrap_err();
    assert!(out.is_empty());
    assert!(err.to_string().contains("Transaction rejected"), "{err:#}");
    assert_eq!(run(&store, &["status"]).unwrap(), "no slots occupied (64 total)\n");
}

#[test]
#[serial]
fn replay_prints_hex_responses() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("slots.img");
    let script = dir.path().join("session.apdu");
    fs::write(
        &script,
        "# device session\n\
         331200001d0ae467b9dd11fa00df2c0000801b020080010200800000000000000000\n\
         \n\
         33110000010a\n\
         331100000103\n",
    )
    .unwrap();
    let out = run(&store, &["replay", script.to_str().unwrap()]).unwrap();
    assert_eq!(
        out,
        "9000\n\
         e467b9dd11fa00df2c0000801b0200800102008000000000000000009000\n\
         6982\n"
    );
}
