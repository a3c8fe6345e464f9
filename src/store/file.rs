// CLASSIFICATION: COMMUNITY
// Filename: file.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! File-backed slot table.
//!
//! The image is `magic | version | count (u16 LE) | count records | sha256`,
//! where each record is the 28-byte wire form of a slot and empty slots are
//! all zero. The digest covers every byte before it. Writes go to a sibling
//! `.tmp` file that is renamed over the image, so a failed write leaves both
//! the file and the in-memory table at their previous state.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use slot_apdu::{SlotEntry, SlotIndex, ENTRY_LEN};

use super::{SlotState, SlotStore, StoreError, MAX_CAPACITY};

const MAGIC: &[u8; 4] = b"SLOT";
const VERSION: u8 = 1;
const PREAMBLE_LEN: usize = 4 + 1 + 2;
const DIGEST_LEN: usize = 32;

/// Slot table persisted to a single image file.
#[derive(Debug)]
pub struct FileSlotStore {
    path: PathBuf,
    slots: Vec<SlotState>,
}

impl FileSlotStore {
    /// Open the image at `path`, creating an empty table of `capacity` slots when absent.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self, StoreError> {
        if capacity > MAX_CAPACITY {
            return Err(StoreError::Capacity(capacity));
        }
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            let store = Self {
                path,
                slots: vec![SlotState::Empty; capacity],
            };
            persist(&store.path, &store.slots)?;
            info!("created slot image {} ({capacity} slots)", store.path.display());
            return Ok(store);
        }
        let slots = decode_image(&fs::read(&path)?)?;
        if slots.len() != capacity {
            return Err(StoreError::Corrupt(format!(
                "image holds {} slots, expected {capacity}",
                slots.len()
            )));
        }
        info!(
            "loaded slot image {} ({} occupied)",
            path.display(),
            slots.iter().filter(|slot| slot.is_occupied()).count()
        );
        Ok(Self { path, slots })
    }

    /// Location of the image file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SlotStore for FileSlotStore {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn read(&self, index: SlotIndex) -> Option<SlotState> {
        self.slots.get(index.as_usize()).copied()
    }

    fn write(&mut self, index: SlotIndex, state: SlotState) -> Result<(), StoreError> {
        let capacity = self.slots.len();
        if index.as_usize() >= capacity {
            return Err(StoreError::InvalidIndex { index, capacity });
        }
        let mut next = self.slots.clone();
        next[index.as_usize()] = state;
        if let Err(err) = persist(&self.path, &next) {
            warn!("slot {index} write to {} failed: {err}", self.path.display());
            return Err(err);
        }
        self.slots = next;
        Ok(())
    }
}

/// Serialize a table into the persisted image format.
pub fn encode_image(slots: &[SlotState]) -> Result<Vec<u8>, StoreError> {
    let count = u16::try_from(slots.len())
        .map_err(|_| StoreError::Corrupt(format!("{} slots exceed image limit", slots.len())))?;
    let mut image = Vec::with_capacity(PREAMBLE_LEN + slots.len() * ENTRY_LEN + DIGEST_LEN);
    image.extend_from_slice(MAGIC);
    image.push(VERSION);
    image.extend_from_slice(&count.to_le_bytes());
    for slot in slots {
        image.extend_from_slice(&slot.to_wire());
    }
    let digest = Sha256::digest(&image);
    image.extend_from_slice(&digest);
    Ok(image)
}

/// Parse and verify a persisted image.
pub fn decode_image(image: &[u8]) -> Result<Vec<SlotState>, StoreError> {
    if image.len() < PREAMBLE_LEN + DIGEST_LEN {
        return Err(StoreError::Corrupt(format!("image too short: {} bytes", image.len())));
    }
    let (content, digest) = image.split_at(image.len() - DIGEST_LEN);
    if Sha256::digest(content).as_slice() != digest {
        return Err(StoreError::Corrupt("digest mismatch".into()));
    }
    if &content[..4] != MAGIC {
        return Err(StoreError::Corrupt("bad magic".into()));
    }
    if content[4] != VERSION {
        return Err(StoreError::Corrupt(format!("unsupported version {}", content[4])));
    }
    let count = usize::from(u16::from_le_bytes([content[5], content[6]]));
    let records = &content[PREAMBLE_LEN..];
    if records.len() != count * ENTRY_LEN {
        return Err(StoreError::Corrupt(format!(
            "{} record bytes for {count} slots",
            records.len()
        )));
    }
    Ok(records
        .chunks_exact(ENTRY_LEN)
        .map(|record| {
            let mut raw = [0u8; ENTRY_LEN];
            raw.copy_from_slice(record);
            SlotState::from_entry(SlotEntry::from_wire(&raw))
        })
        .collect())
}

fn persist(path: &Path, slots: &[SlotState]) -> Result<(), StoreError> {
    let image = encode_image(slots)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(&image)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    debug!("persisted {} bytes to {}", image.len(), path.display());
    Ok(())
}
