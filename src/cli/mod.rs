// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! `slotkeeper` command line. Each invocation opens the configured slot
//! table, drives it through the host client and prints the outcome.

mod review;

pub use review::TerminalReview;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use slot_apdu::{AccountId, DerivationPath, ReturnCode, SlotEntry};

use crate::config::Config;
use crate::confirm::{AutoReview, Decision, ReviewUi};
use crate::transport::{InProcessTransport, Reply, SlotClient, Transport};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration file; defaults to $SLOTKEEPER_CONFIG.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Slot image file, overriding `store.path`.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    /// Approve every change without prompting.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show which slots are occupied.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Print the account and path bound to a slot.
    Get {
        slot: u8,
        #[arg(long)]
        json: bool,
    },
    /// Bind a slot to an account and derivation path.
    Set {
        slot: u8,
        account: AccountId,
        path: DerivationPath,
    },
    /// Clear a slot.
    Delete { slot: u8 },
    /// Send raw hex APDUs from a file, one per line, and print the responses.
    Replay { file: PathBuf },
}

#[derive(Debug, Serialize)]
struct StatusReport {
    slots: Vec<bool>,
    occupied: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct SlotReport {
    slot: u8,
    account: String,
    path: String,
}

impl SlotReport {
    fn new(slot: u8, entry: &SlotEntry) -> Self {
        Self {
            slot,
            account: entry.account.to_string(),
            path: entry.path.to_string(),
        }
    }
}

/// Entry point for the binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ui: Box<dyn ReviewUi> = if cli.yes {
        Box::new(AutoReview(Decision::Approve))
    } else {
        Box::new(TerminalReview::new(io::stdin().lock(), io::stderr()))
    };
    let stdout = io::stdout();
    execute(cli, ui, &mut stdout.lock())
}

/// Run `cli` against the configured table, answering reviews with `ui`.
pub fn execute<U: ReviewUi>(cli: Cli, ui: U, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut config = Config::load_active(cli.config.as_deref())?;
    if let Some(path) = cli.store {
        config.store.path = Some(path);
    }
    let dispatcher = config.dispatcher().context("failed to open slot store")?;
    let transport = InProcessTransport::new(dispatcher, ui);
    let mut client = SlotClient::with_codec(transport, config.codec());

    match cli.command {
        Command::Status { json } => {
            let flags = expect_value(client.slot_status()?, "status")?;
            let report = StatusReport {
                occupied: flags
                    .iter()
                    .enumerate()
                    .filter_map(|(index, used)| used.then_some(index))
                    .collect(),
                slots: flags,
            };
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else if report.occupied.is_empty() {
                writeln!(out, "no slots occupied ({} total)", report.slots.len())?;
            } else {
                for index in &report.occupied {
                    writeln!(out, "slot {index}: occupied")?;
                }
            }
        }
        Command::Get { slot, json } => {
            let entry = expect_value(client.get_slot(slot)?, &format!("get slot {slot}"))?;
            let report = SlotReport::new(slot, &entry);
            if json {
                serde_json::to_writer_pretty(&mut *out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(out, "slot {}: {} {}", report.slot, report.account, report.path)?;
            }
        }
        Command::Set {
            slot,
            account,
            path,
        } => {
            expect_value(client.set_slot(slot, account, path)?, &format!("set slot {slot}"))?;
            writeln!(out, "slot {slot} set to {account} {path}")?;
        }
        Command::Delete { slot } => {
            expect_value(client.delete_slot(slot)?, &format!("delete slot {slot}"))?;
            writeln!(out, "slot {slot} cleared")?;
        }
        Command::Replay { file } => {
            let script = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            replay(client.transport_mut(), &script, out)?;
        }
    }
    Ok(())
}

/// Exchange every APDU in `script`, writing one hex response per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn replay(transport: &mut dyn Transport, script: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let apdu = hex::decode(line).with_context(|| format!("line {}: invalid hex", number + 1))?;
        debug!("replay line {}", number + 1);
        let response = transport.exchange(&apdu)?;
        writeln!(out, "{}", hex::encode(response))?;
    }
    Ok(())
}

fn expect_value<T>(reply: Reply<T>, what: &str) -> anyhow::Result<T> {
    match reply.value {
        Some(value) if reply.return_code == ReturnCode::Success => Ok(value),
        _ => bail!("{what} failed: {}", reply.return_code),
    }
}
