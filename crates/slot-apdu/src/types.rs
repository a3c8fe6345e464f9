// Author: Lukas Bower
// Purpose: Define slot APDU wire types, constants, and the return code vocabulary.
#![allow(clippy::module_name_repetitions)]

//! Slot APDU data model shared across the device handler and host clients.

use core::fmt;
use core::str::FromStr;

use alloc::vec::Vec;

/// Instruction class accepted by the slot application.
pub const CLA: u8 = 0x33;

/// Length of the fixed request header `[cla][ins][p1][p2][len]`.
pub const HEADER_LEN: usize = 5;

/// Width of an account identifier in bytes.
pub const ACCOUNT_LEN: usize = 8;

/// Number of components carried by every derivation path.
pub const PATH_COMPONENTS: usize = 5;

/// Width of a single path component on the wire.
pub const PATH_COMPONENT_LEN: usize = 4;

/// Width of an encoded derivation path.
pub const PATH_LEN: usize = PATH_COMPONENTS * PATH_COMPONENT_LEN;

/// Width of an encoded slot entry (account followed by path).
pub const ENTRY_LEN: usize = ACCOUNT_LEN + PATH_LEN;

/// Body length of a `GET` request.
pub const GET_BODY_LEN: usize = 1;

/// Body length of a `SET` request.
pub const SET_BODY_LEN: usize = 1 + ENTRY_LEN;

/// Number of slots exposed by the device table.
pub const SLOT_COUNT: usize = 64;

/// Hardened bit of a BIP32 path component.
pub const HARDENED: u32 = 0x8000_0000;

/// Width of the trailing return code.
pub const RETURN_CODE_LEN: usize = 2;

/// Slot instructions understood by the device.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Report the occupancy of every slot.
    SlotStatus = 0x10,
    /// Read one slot.
    GetSlot = 0x11,
    /// Write or clear one slot.
    SetSlot = 0x12,
}

impl Instruction {
    /// Body length the instruction requires.
    #[must_use]
    pub fn body_len(self) -> usize {
        match self {
            Self::SlotStatus => 0,
            Self::GetSlot => GET_BODY_LEN,
            Self::SetSlot => SET_BODY_LEN,
        }
    }

    /// Whether the instruction mutates the slot table.
    #[must_use]
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::SetSlot)
    }
}

impl TryFrom<u8> for Instruction {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x10 => Self::SlotStatus,
            0x11 => Self::GetSlot,
            0x12 => Self::SetSlot,
            other => return Err(CodecError::InsNotSupported(other)),
        })
    }
}

impl From<Instruction> for u8 {
    fn from(value: Instruction) -> Self {
        value as u8
    }
}

/// Closed set of status words appended to every response.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// Command completed.
    Success = 0x9000,
    /// Internal failure while executing a validated command.
    ExecutionError = 0x6400,
    /// Header or body length does not match the instruction layout.
    WrongLength = 0x6700,
    /// Requested slot is empty or out of range.
    EmptyBuffer = 0x6982,
    /// Body is well formed but carries values the device refuses.
    DataInvalid = 0x6984,
    /// The device holder rejected the change.
    CommandNotAllowed = 0x6986,
    /// P1 or P2 carry a value other than zero.
    InvalidP1P2 = 0x6B00,
    /// Instruction byte is not recognised.
    InsNotSupported = 0x6D00,
    /// Class byte does not address this application.
    ClaNotSupported = 0x6E00,
    /// Catch-all for status words outside this vocabulary.
    Unknown = 0x6F00,
}

impl ReturnCode {
    /// Every status word in the vocabulary.
    pub const ALL: [ReturnCode; 10] = [
        Self::Success,
        Self::ExecutionError,
        Self::WrongLength,
        Self::EmptyBuffer,
        Self::DataInvalid,
        Self::CommandNotAllowed,
        Self::InvalidP1P2,
        Self::InsNotSupported,
        Self::ClaNotSupported,
        Self::Unknown,
    ];

    /// Raw status word.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Big-endian wire form.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; RETURN_CODE_LEN] {
        self.as_u16().to_be_bytes()
    }

    /// Whether the code reports success.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Message reported to host applications for this code.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "No errors",
            Self::ExecutionError => "Execution Error",
            Self::WrongLength => "Wrong Length",
            Self::EmptyBuffer => "Empty Buffer",
            Self::DataInvalid => "Data is invalid",
            Self::CommandNotAllowed => "Transaction rejected",
            Self::InvalidP1P2 => "Invalid P1/P2",
            Self::InsNotSupported => "Instruction not supported",
            Self::ClaNotSupported => "App does not seem to be open",
            Self::Unknown => "Unknown error",
        }
    }
}

impl TryFrom<u16> for ReturnCode {
    type Error = CodecError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_u16() == value)
            .ok_or(CodecError::UnknownReturnCode(value))
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x} {}", self.as_u16(), self.message())
    }
}

/// Index of a slot in the device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Wrap a raw slot index. Range checks belong to the store.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw wire value.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Index usable for table lookups.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u8> for SlotIndex {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque account identifier bound to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccountId([u8; ACCOUNT_LEN]);

impl AccountId {
    /// All-zero account, the empty-slot sentinel on the wire.
    pub const ZERO: Self = Self([0u8; ACCOUNT_LEN]);

    /// Construct an account from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ACCOUNT_LEN]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_LEN] {
        &self.0
    }

    /// Whether the account equals the zero sentinel.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for AccountId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        let mut bytes = [0u8; ACCOUNT_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| CodecError::InvalidAccount)?;
        Ok(Self(bytes))
    }
}

/// Fixed-depth BIP32 derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DerivationPath([u32; PATH_COMPONENTS]);

impl DerivationPath {
    /// All-zero path, the empty-slot sentinel on the wire.
    pub const ZERO: Self = Self([0u32; PATH_COMPONENTS]);

    /// Construct a path from raw components (hardened bit included).
    #[must_use]
    pub const fn new(components: [u32; PATH_COMPONENTS]) -> Self {
        Self(components)
    }

    /// Raw components, hardened bit included.
    #[must_use]
    pub fn components(&self) -> &[u32; PATH_COMPONENTS] {
        &self.0
    }

    /// Whether the path equals the zero sentinel.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|component| *component == 0)
    }

    /// Decode the little-endian wire form.
    #[must_use]
    pub fn from_wire(bytes: &[u8; PATH_LEN]) -> Self {
        let mut components = [0u32; PATH_COMPONENTS];
        for (component, chunk) in components
            .iter_mut()
            .zip(bytes.chunks_exact(PATH_COMPONENT_LEN))
        {
            let mut raw = [0u8; PATH_COMPONENT_LEN];
            raw.copy_from_slice(chunk);
            *component = u32::from_le_bytes(raw);
        }
        Self(components)
    }

    /// Encode the little-endian wire form.
    #[must_use]
    pub fn to_wire(&self) -> [u8; PATH_LEN] {
        let mut bytes = [0u8; PATH_LEN];
        for (chunk, component) in bytes.chunks_exact_mut(PATH_COMPONENT_LEN).zip(self.0) {
            chunk.copy_from_slice(&component.to_le_bytes());
        }
        bytes
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for component in self.0 {
            if component & HARDENED != 0 {
                write!(f, "/{}'", component & !HARDENED)?;
            } else {
                write!(f, "/{component}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let text = text.strip_prefix("m/").unwrap_or(text);
        let mut components = [0u32; PATH_COMPONENTS];
        let mut parts = text.split('/');
        for component in components.iter_mut() {
            let part = parts.next().ok_or(CodecError::InvalidPath)?;
            let (digits, hardened) = match part
                .strip_suffix('\'')
                .or_else(|| part.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (part, false),
            };
            let value: u32 = digits.parse().map_err(|_| CodecError::InvalidPath)?;
            if value & HARDENED != 0 {
                return Err(CodecError::InvalidPath);
            }
            *component = if hardened { value | HARDENED } else { value };
        }
        if parts.next().is_some() {
            return Err(CodecError::InvalidPath);
        }
        Ok(Self(components))
    }
}

/// Account and path bound to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotEntry {
    /// Account identifier stored in the slot.
    pub account: AccountId,
    /// Derivation path stored in the slot.
    pub path: DerivationPath,
}

impl SlotEntry {
    /// All-zero entry, the empty-slot sentinel on the wire.
    pub const ZERO: Self = Self {
        account: AccountId::ZERO,
        path: DerivationPath::ZERO,
    };

    /// Construct an entry.
    #[must_use]
    pub const fn new(account: AccountId, path: DerivationPath) -> Self {
        Self { account, path }
    }

    /// Whether both fields carry the zero sentinel.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.account.is_zero() && self.path.is_zero()
    }

    /// Decode `[account:8][path:20]`.
    #[must_use]
    pub fn from_wire(bytes: &[u8; ENTRY_LEN]) -> Self {
        let mut account = [0u8; ACCOUNT_LEN];
        account.copy_from_slice(&bytes[..ACCOUNT_LEN]);
        let mut path = [0u8; PATH_LEN];
        path.copy_from_slice(&bytes[ACCOUNT_LEN..]);
        Self {
            account: AccountId::from_bytes(account),
            path: DerivationPath::from_wire(&path),
        }
    }

    /// Encode `[account:8][path:20]`.
    #[must_use]
    pub fn to_wire(&self) -> [u8; ENTRY_LEN] {
        let mut bytes = [0u8; ENTRY_LEN];
        bytes[..ACCOUNT_LEN].copy_from_slice(self.account.as_bytes());
        bytes[ACCOUNT_LEN..].copy_from_slice(&self.path.to_wire());
        bytes
    }
}

/// Decoded slot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Report slot occupancy.
    SlotStatus,
    /// Read one slot.
    GetSlot {
        /// Slot to read.
        slot: SlotIndex,
    },
    /// Write one slot; the zero entry clears it.
    SetSlot {
        /// Slot to write.
        slot: SlotIndex,
        /// Values to store.
        entry: SlotEntry,
    },
}

impl Request {
    /// Instruction carried by the request.
    #[must_use]
    pub fn instruction(&self) -> Instruction {
        match self {
            Self::SlotStatus => Instruction::SlotStatus,
            Self::GetSlot { .. } => Instruction::GetSlot,
            Self::SetSlot { .. } => Instruction::SetSlot,
        }
    }
}

/// Payload preceding the return code of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// No payload.
    Empty,
    /// One flag per slot, in index order.
    SlotStatus(Vec<bool>),
    /// Contents of a read slot.
    Slot(SlotEntry),
}

/// Response to a slot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Trailing status word.
    pub code: ReturnCode,
    /// Payload, only ever present with [`ReturnCode::Success`].
    pub body: ResponseBody,
}

impl Response {
    /// Successful response carrying `body`.
    #[must_use]
    pub fn ok(body: ResponseBody) -> Self {
        Self {
            code: ReturnCode::Success,
            body,
        }
    }

    /// Payload-free response carrying `code`.
    #[must_use]
    pub fn status(code: ReturnCode) -> Self {
        Self {
            code,
            body: ResponseBody::Empty,
        }
    }
}

/// Possible errors produced while encoding or decoding slot APDUs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer shorter than the fixed header or return code.
    #[error("truncated apdu")]
    Truncated,
    /// Class byte does not address this application.
    #[error("class 0x{0:02x} not supported")]
    ClassNotSupported(u8),
    /// Instruction byte is not recognised.
    #[error("instruction 0x{0:02x} not supported")]
    InsNotSupported(u8),
    /// P1/P2 carried a non-zero value.
    #[error("invalid parameters p1=0x{p1:02x} p2=0x{p2:02x}")]
    InvalidParams {
        /// First parameter byte.
        p1: u8,
        /// Second parameter byte.
        p2: u8,
    },
    /// Declared body length differs from the bytes present.
    #[error("length mismatch: declared {declared} actual {actual}")]
    LengthMismatch {
        /// Length declared in the header.
        declared: usize,
        /// Bytes actually present after the header.
        actual: usize,
    },
    /// Body length does not fit the instruction layout.
    #[error("body of {actual} bytes invalid for {instruction:?}, expected {expected}")]
    BodyLength {
        /// Instruction being decoded.
        instruction: Instruction,
        /// Fixed body size of the instruction.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// Status word outside the closed vocabulary.
    #[error("unknown return code 0x{0:04x}")]
    UnknownReturnCode(u16),
    /// Account identifier text was not 8 hex-encoded bytes.
    #[error("invalid account identifier")]
    InvalidAccount,
    /// Derivation path text was not five numeric components.
    #[error("invalid derivation path")]
    InvalidPath,
    /// Status bitmap carried something other than 0x00 or 0x01.
    #[error("invalid slot status byte 0x{0:02x}")]
    InvalidStatusByte(u8),
}

impl CodecError {
    /// Status word reported to the host for this failure.
    #[must_use]
    pub fn return_code(&self) -> ReturnCode {
        match self {
            Self::Truncated | Self::LengthMismatch { .. } | Self::BodyLength { .. } => {
                ReturnCode::WrongLength
            }
            Self::ClassNotSupported(_) => ReturnCode::ClaNotSupported,
            Self::InsNotSupported(_) => ReturnCode::InsNotSupported,
            Self::InvalidParams { .. } => ReturnCode::InvalidP1P2,
            Self::InvalidAccount | Self::InvalidPath | Self::InvalidStatusByte(_) => {
                ReturnCode::DataInvalid
            }
            Self::UnknownReturnCode(_) => ReturnCode::Unknown,
        }
    }
}
