use anchor_lang::prelude::Pubkey;
use thiserror::Error;

/// Errors surfaced by the directory client.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // ========================================================================
    // Input Validation Errors
    // ========================================================================
    #[error("Identifier too long: {len} bytes (max {max})")]
    InvalidIdentifierLength { len: usize, max: usize },

    #[error("Record type is invalid - identifier could not be classified")]
    InvalidRecordType,

    #[error("Invalid escrow chain triple: prev={prev}, curr={curr}, next={next}")]
    InvalidChainTriple { prev: u32, curr: u32, next: u32 },

    #[error("Update of {len} bytes at offset {offset} overflows the record")]
    UpdateOutOfBounds { offset: u32, len: usize },

    #[error("Address derivation failed for seeds of {account}")]
    AddressDerivation { account: &'static str },

    // ========================================================================
    // Decode-State Errors
    // ========================================================================
    #[error("Account not found: {0}")]
    AccountAbsent(Pubkey),

    #[error("Account {address} is owned by {owner}, not the directory program")]
    AccountNotOwnedByProgram { address: Pubkey, owner: Pubkey },

    #[error("Record version {found} is older than the minimum supported {min}")]
    VersionTooOld { found: u8, min: u8 },

    #[error("Record has no owner assigned")]
    UnownedRecord,

    // ========================================================================
    // Chain Integrity Errors
    // ========================================================================
    #[error("Corrupt escrow chain at index {index}: {reason}")]
    CorruptChain { index: u32, reason: String },

    #[error("Escrow chain walk exceeded {limit} nodes")]
    ChainWalkLimit { limit: u32 },

    #[error("Escrow chain has no free index left")]
    EscrowChainFull,

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors reported by the injected ledger reader. Passed through unchanged.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
