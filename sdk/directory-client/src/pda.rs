//! Program-derived addresses for every directory account.
//!
//! Seed layout (tag byte first):
//! - Name record:          `[Record, record_type, digest]`
//! - Escrow root / node:   `[Escrow, record_type, digest, index_le]` (root = index 0)
//! - Config:               `[Config, config_type]`
//! - Notification request: `[NotifyReq, record_type, transaction_id]`
//!
//! Addresses are recomputed on every call; nothing is cached.

use anchor_lang::prelude::*;
use tracing::debug;

use crate::constants::ESCROW_ROOT_INDEX;
use crate::errors::{DirectoryError, Result};
use crate::hasher::IdentifierDigest;
use crate::state::RecordType;

/// Leading seed byte separating account namespaces
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum AccountType {
    Record = 0,
    Escrow = 1,
    Config = 2,
    NotifyReq = 3,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ConfigType {
    Fees = 0,
}

/// A derived address together with its bump seed
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

fn find(seeds: &[&[u8]], program_id: &Pubkey, account: &'static str) -> Result<DerivedAddress> {
    let (address, bump) = Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(DirectoryError::AddressDerivation { account })?;
    debug!(%address, bump, account, "derived address");
    Ok(DerivedAddress { address, bump })
}

/// Derive name record PDA
pub fn name_record_address(
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
) -> Result<DerivedAddress> {
    let record_type = record_type.ensure_valid()?;
    find(
        &[
            &[AccountType::Record as u8],
            &[record_type.as_u8()],
            digest.as_ref(),
        ],
        program_id,
        "name_record",
    )
}

/// Derive escrow node PDA. Index 0 is the chain root.
pub fn escrow_node_address(
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    index: u32,
) -> Result<DerivedAddress> {
    let record_type = record_type.ensure_valid()?;
    find(
        &[
            &[AccountType::Escrow as u8],
            &[record_type.as_u8()],
            digest.as_ref(),
            &index.to_le_bytes(),
        ],
        program_id,
        "escrow",
    )
}

/// Derive escrow root PDA
pub fn escrow_root_address(
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
) -> Result<DerivedAddress> {
    escrow_node_address(program_id, record_type, digest, ESCROW_ROOT_INDEX)
}

/// Derive config PDA
pub fn config_address(program_id: &Pubkey, config_type: ConfigType) -> Result<DerivedAddress> {
    find(
        &[&[AccountType::Config as u8], &[config_type as u8]],
        program_id,
        "config",
    )
}

/// Derive notification request PDA
pub fn notification_request_address(
    program_id: &Pubkey,
    record_type: RecordType,
    transaction_id: &[u8; 32],
) -> Result<DerivedAddress> {
    let record_type = record_type.ensure_valid()?;
    find(
        &[
            &[AccountType::NotifyReq as u8],
            &[record_type.as_u8()],
            transaction_id,
        ],
        program_id,
        "notification_request",
    )
}
