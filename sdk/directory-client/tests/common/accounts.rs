//! Account seeding helpers
//!
//! Accounts are encoded with the crate's own layouts and stored at their
//! derived addresses, owned by the test program id unless stated otherwise.

use anchor_lang::prelude::Pubkey;
use directory_client::constants::{CURRENT_VERSION_MAJOR, ESCROW_ROOT_INDEX, TERMINAL_INDEX};
use directory_client::pda::{
    config_address, escrow_node_address, escrow_root_address, name_record_address, ConfigType,
};
use directory_client::state::{
    AccountLayout, EscrowNode, EscrowRoot, FeeSchedule, NameRecord, StateFlags,
};
use directory_client::{IdentifierDigest, RecordType};

use super::ledger::MockLedger;

/// Build a name record with the current version
pub fn name_record(record_type: RecordType, state: u16, owner: Pubkey) -> NameRecord {
    NameRecord {
        version_major: CURRENT_VERSION_MAJOR,
        record_type,
        state: StateFlags::from_bits(state),
        signatory: Pubkey::new_unique(),
        owner,
        routing_data: vec![],
    }
}

/// Store a name record at its PDA, returning the address
pub fn put_name_record(
    ledger: &MockLedger,
    program_id: &Pubkey,
    digest: &IdentifierDigest,
    record: &NameRecord,
) -> Pubkey {
    let address = name_record_address(program_id, record.record_type, digest)
        .unwrap()
        .address;
    ledger.insert(address, *program_id, record.encode());
    address
}

pub fn put_root(
    ledger: &MockLedger,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    next_index: u32,
) -> Pubkey {
    let address = escrow_root_address(program_id, record_type, digest)
        .unwrap()
        .address;
    let name_account = name_record_address(program_id, record_type, digest)
        .unwrap()
        .address;
    let root = EscrowRoot {
        version_major: CURRENT_VERSION_MAJOR,
        next_index,
        name_account,
    };
    ledger.insert(address, *program_id, root.encode());
    address
}

#[allow(clippy::too_many_arguments)]
pub fn put_node(
    ledger: &MockLedger,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    prev_index: u32,
    index: u32,
    next_index: u32,
    sender: Pubkey,
) -> Pubkey {
    let address = escrow_node_address(program_id, record_type, digest, index)
        .unwrap()
        .address;
    let name_account = name_record_address(program_id, record_type, digest)
        .unwrap()
        .address;
    let node = EscrowNode {
        version_major: CURRENT_VERSION_MAJOR,
        next_index,
        name_account,
        index,
        prev_index,
        sender,
        mint: Pubkey::new_from_array([9u8; 32]),
    };
    ledger.insert(address, *program_id, node.encode());
    address
}

/// Seed a well-linked chain holding exactly `indices` (ascending), all from `sender`
pub fn seed_chain(
    ledger: &MockLedger,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    indices: &[u32],
    sender: Pubkey,
) {
    let first = indices.first().copied().unwrap_or(TERMINAL_INDEX);
    put_root(ledger, program_id, record_type, digest, first);

    for (position, index) in indices.iter().enumerate() {
        let prev = if position == 0 {
            ESCROW_ROOT_INDEX
        } else {
            indices[position - 1]
        };
        let next = indices.get(position + 1).copied().unwrap_or(TERMINAL_INDEX);
        put_node(ledger, program_id, record_type, digest, prev, *index, next, sender);
    }
}

pub fn put_fee_schedule(ledger: &MockLedger, program_id: &Pubkey, schedule: &FeeSchedule) -> Pubkey {
    let address = config_address(program_id, ConfigType::Fees).unwrap().address;
    ledger.insert(address, *program_id, schedule.encode());
    address
}
