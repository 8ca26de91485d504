use anchor_lang::prelude::*;
use solana_program::system_program;

use crate::constants::*;
use crate::errors::{DirectoryError, Result};
use crate::hasher::IdentifierDigest;

// ============================================================================
// Shared Types
// ============================================================================

/// Identifier scheme of a name record.
///
/// Encoded as a single byte (declaration order). `Invalid` is what the
/// normalizer reports for input it cannot classify; it never reaches the wire.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum RecordType {
    Invalid,
    Phone,
    Email,
    Handle,
}

impl RecordType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Invalid),
            1 => Some(Self::Phone),
            2 => Some(Self::Email),
            3 => Some(Self::Handle),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Reject `Invalid` before it is used in a seed or an instruction
    pub fn ensure_valid(self) -> Result<Self> {
        match self {
            Self::Invalid => Err(DirectoryError::InvalidRecordType),
            valid => Ok(valid),
        }
    }
}

/// Both "no owner" encodings found in name records.
///
/// Older records store the system program id, newer ones `Pubkey::default()`.
/// They share a byte representation today but are compared separately.
pub const UNOWNED_ADDRESSES: [Pubkey; 2] = [Pubkey::new_from_array([0u8; 32]), system_program::ID];

pub fn is_unowned(address: &Pubkey) -> bool {
    UNOWNED_ADDRESSES.iter().any(|zero| zero == address)
}

/// Fixed-size account layout shared by every directory account kind.
pub trait AccountLayout: Sized {
    /// Human-readable account kind, used in logs and errors
    const KIND: &'static str;

    /// Minimum number of bytes a valid account of this kind carries
    const MIN_SIZE: usize;

    /// Decode account bytes. Short or malformed buffers yield `None`.
    fn decode(data: &[u8]) -> Option<Self>;

    fn encode(&self) -> Vec<u8>;
}

/// Result of reading a directory account from the ledger.
///
/// Callers must handle all three cases; there is no nullable shortcut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountState<T> {
    Present(T),
    /// Not created yet, or bytes that do not decode as this account kind
    Absent,
    /// Account exists but belongs to another program
    WrongOwner(Pubkey),
}

impl<T> AccountState<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Turn the non-present cases into the matching error for `address`.
    pub fn require(self, address: &Pubkey) -> Result<T> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent => Err(DirectoryError::AccountAbsent(*address)),
            Self::WrongOwner(owner) => Err(DirectoryError::AccountNotOwnedByProgram {
                address: *address,
                owner,
            }),
        }
    }
}

fn decode_fixed<T: AnchorDeserialize>(data: &[u8], min_size: usize) -> Option<T> {
    if data.len() < min_size {
        return None;
    }
    let mut cursor = data;
    T::deserialize(&mut cursor).ok()
}

fn encode_fixed<T: AnchorSerialize>(value: &T, size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    // Writing into a Vec cannot fail
    let _ = value.serialize(&mut data);
    data
}

// ============================================================================
// Name Record
// ============================================================================

/// Name record state flags, decoded once from the packed u16.
///
/// Bits without a named flag are carried through unchanged, so a record
/// decoded and encoded again keeps its state word.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct StateFlags {
    pub locked: bool,
    pub paid_to_verify: bool,
    pub paid_to_assign: bool,
    pub contested: bool,
    pub notifications_disabled: bool,
    pub(crate) unknown: u16,
}

impl StateFlags {
    const LOCKED: u16 = 1 << 0;
    const PAID_TO_VERIFY: u16 = 1 << 1;
    const PAID_TO_ASSIGN: u16 = 1 << 2;
    const CONTESTED: u16 = 1 << 3;
    const NOTIFICATIONS_DISABLED: u16 = 1 << 4;
    const KNOWN: u16 = Self::LOCKED
        | Self::PAID_TO_VERIFY
        | Self::PAID_TO_ASSIGN
        | Self::CONTESTED
        | Self::NOTIFICATIONS_DISABLED;

    pub fn from_bits(bits: u16) -> Self {
        Self {
            locked: bits & Self::LOCKED != 0,
            paid_to_verify: bits & Self::PAID_TO_VERIFY != 0,
            paid_to_assign: bits & Self::PAID_TO_ASSIGN != 0,
            contested: bits & Self::CONTESTED != 0,
            notifications_disabled: bits & Self::NOTIFICATIONS_DISABLED != 0,
            unknown: bits & !Self::KNOWN,
        }
    }

    /// Bits set on the ledger that no named flag covers
    pub fn unknown_bits(&self) -> u16 {
        self.unknown
    }

    pub fn bits(&self) -> u16 {
        let mut bits = self.unknown;
        if self.locked {
            bits |= Self::LOCKED;
        }
        if self.paid_to_verify {
            bits |= Self::PAID_TO_VERIFY;
        }
        if self.paid_to_assign {
            bits |= Self::PAID_TO_ASSIGN;
        }
        if self.contested {
            bits |= Self::CONTESTED;
        }
        if self.notifications_disabled {
            bits |= Self::NOTIFICATIONS_DISABLED;
        }
        bits
    }
}

/// On-wire name record header (96 bytes)
#[derive(AnchorSerialize, AnchorDeserialize)]
struct NameRecordHeader {
    version_major: u8,
    record_type: RecordType,
    state: u16,
    reserved: [u8; NAME_RECORD_RESERVED],
    signatory: Pubkey,
    owner: Pubkey,
}

/// Directory entry mapping an identifier digest to its owner.
/// PDA seeds: [Record, record_type, digest]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRecord {
    pub version_major: u8,
    pub record_type: RecordType,
    pub state: StateFlags,
    /// Key allowed to claim or assign the record
    pub signatory: Pubkey,
    pub owner: Pubkey,
    /// Opaque bytes past the fixed header
    pub routing_data: Vec<u8>,
}

impl NameRecord {
    pub fn is_authorized(&self) -> bool {
        self.state.paid_to_verify && self.state.paid_to_assign
    }

    pub fn is_ready_to_assign(&self) -> bool {
        self.state.paid_to_assign && !self.state.paid_to_verify
    }

    pub fn has_owner(&self) -> bool {
        !is_unowned(&self.owner)
    }

    pub fn is_assigned_and_valid(&self) -> bool {
        self.version_major >= MIN_VERSION_MAJOR && self.has_owner()
    }

    /// Owner of a valid assignment, or why the record does not have one.
    pub fn assigned_owner(&self, min_version: u8) -> Result<Pubkey> {
        if self.version_major < min_version {
            return Err(DirectoryError::VersionTooOld {
                found: self.version_major,
                min: min_version,
            });
        }
        if !self.has_owner() {
            return Err(DirectoryError::UnownedRecord);
        }
        Ok(self.owner)
    }

    pub fn size(&self) -> usize {
        NAME_RECORD_HEADER_SIZE + self.routing_data.len()
    }
}

impl AccountLayout for NameRecord {
    const KIND: &'static str = "name_record";
    const MIN_SIZE: usize = NAME_RECORD_HEADER_SIZE;

    fn decode(data: &[u8]) -> Option<Self> {
        let header: NameRecordHeader = decode_fixed(data, Self::MIN_SIZE)?;
        Some(Self {
            version_major: header.version_major,
            record_type: header.record_type,
            state: StateFlags::from_bits(header.state),
            signatory: header.signatory,
            owner: header.owner,
            routing_data: data[NAME_RECORD_HEADER_SIZE..].to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        let header = NameRecordHeader {
            version_major: self.version_major,
            record_type: self.record_type,
            state: self.state.bits(),
            reserved: [0u8; NAME_RECORD_RESERVED],
            signatory: self.signatory,
            owner: self.owner,
        };
        let mut data = encode_fixed(&header, self.size());
        data.extend_from_slice(&self.routing_data);
        data
    }
}

// ============================================================================
// Escrow Chain
// ============================================================================

/// Sentinel anchoring an escrow chain. Never holds funds.
/// PDA seeds: [Escrow, record_type, digest, 0u32]
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct EscrowRoot {
    pub version_major: u8,
    /// First node of the chain, `TERMINAL_INDEX` when empty
    pub next_index: u32,
    /// Name record this chain belongs to
    pub name_account: Pubkey,
}

impl AccountLayout for EscrowRoot {
    const KIND: &'static str = "escrow_root";
    const MIN_SIZE: usize = ESCROW_ROOT_SIZE;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_fixed(data, Self::MIN_SIZE)
    }

    fn encode(&self) -> Vec<u8> {
        encode_fixed(self, Self::MIN_SIZE)
    }
}

/// Pending payment for an identifier.
/// PDA seeds: [Escrow, record_type, digest, index]
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct EscrowNode {
    pub version_major: u8,
    pub next_index: u32,
    pub name_account: Pubkey,
    pub index: u32,
    pub prev_index: u32,
    /// Who funded the escrow
    pub sender: Pubkey,
    /// Token mint held in escrow
    pub mint: Pubkey,
}

impl EscrowNode {
    /// `prev_index < index < next_index`
    pub fn is_linked_consistently(&self) -> bool {
        self.prev_index < self.index && self.index < self.next_index
    }

    pub fn is_last(&self) -> bool {
        self.next_index == TERMINAL_INDEX
    }
}

impl AccountLayout for EscrowNode {
    const KIND: &'static str = "escrow_node";
    const MIN_SIZE: usize = ESCROW_NODE_SIZE;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_fixed(data, Self::MIN_SIZE)
    }

    fn encode(&self) -> Vec<u8> {
        encode_fixed(self, Self::MIN_SIZE)
    }
}

// ============================================================================
// Config
// ============================================================================

/// Fee schedule account (lamports per operation).
/// PDA seeds: [Config, ConfigType::Fees]
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FeeSchedule {
    pub version_major: u8,
    /// Authority allowed to update the schedule
    pub authority: Pubkey,
    pub verify_fee: u64,
    pub assign_fee: u64,
    pub transfer_fee: u64,
    pub escrow_fee: u64,
    pub notification_fee: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            version_major: CURRENT_VERSION_MAJOR,
            authority: Pubkey::default(),
            verify_fee: default_fees::VERIFY,
            assign_fee: default_fees::ASSIGN,
            transfer_fee: default_fees::TRANSFER,
            escrow_fee: default_fees::ESCROW,
            notification_fee: default_fees::NOTIFICATION,
        }
    }
}

impl AccountLayout for FeeSchedule {
    const KIND: &'static str = "config";
    const MIN_SIZE: usize = FEE_SCHEDULE_SIZE;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_fixed(data, Self::MIN_SIZE)
    }

    fn encode(&self) -> Vec<u8> {
        encode_fixed(self, Self::MIN_SIZE)
    }
}

// ============================================================================
// Notification Request
// ============================================================================

/// Pending off-chain notification for a transfer to an identifier.
/// PDA seeds: [NotifyReq, record_type, transaction_id]
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct NotificationRequest {
    pub version_major: u8,
    pub record_type: RecordType,
    pub sender: Pubkey,
    /// Digest of the recipient identifier
    pub recipient: IdentifierDigest,
    pub transaction_id: [u8; 32],
    pub mint: Pubkey,
    pub amount: u64,
}

impl AccountLayout for NotificationRequest {
    const KIND: &'static str = "notification_request";
    const MIN_SIZE: usize = NOTIFICATION_REQUEST_SIZE;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_fixed(data, Self::MIN_SIZE)
    }

    fn encode(&self) -> Vec<u8> {
        encode_fixed(self, Self::MIN_SIZE)
    }
}
