//! Instruction encoding for the directory program.
//!
//! Wire format: one opcode byte (the variant index of [`DirectoryInstruction`])
//! followed by the variant's fields in declaration order, Borsh-encoded
//! (integers little-endian, byte vectors prefixed with a u32 length).
//!
//! The program reads accounts by position, so the account order documented on
//! each builder is part of the wire contract.

use anchor_lang::prelude::*;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    system_program,
};

use crate::constants::MAX_ROUTING_DATA_SIZE;
use crate::errors::{DirectoryError, Result};
use crate::escrow::EscrowTriple;
use crate::hasher::IdentifierDigest;
use crate::pda::{
    config_address, escrow_node_address, escrow_root_address, name_record_address,
    notification_request_address, ConfigType,
};
use crate::state::{FeeSchedule, RecordType};

/// Instruction payloads. Variant order fixes the opcodes; do not reorder.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub enum DirectoryInstruction {
    /// 0
    Authorize {
        digest: IdentifierDigest,
        record_type: RecordType,
    },
    /// 1
    SetClaimKey { claim_key: Pubkey },
    /// 2
    Assign { owner: Pubkey },
    /// 3
    Transfer { new_owner: Pubkey },
    /// 4
    Update { offset: u32, data: Vec<u8> },
    /// 5
    Delete,
    /// 6
    CreateEscrow {
        digest: IdentifierDigest,
        record_type: RecordType,
        prev_index: u32,
        curr_index: u32,
        next_index: u32,
        mint: Pubkey,
    },
    /// 7
    WithdrawEscrow {
        prev_index: u32,
        curr_index: u32,
        next_index: u32,
    },
    /// 8
    DeleteEscrow {
        prev_index: u32,
        curr_index: u32,
        next_index: u32,
    },
    /// 9
    UpdateConfig {
        verify_fee: u64,
        assign_fee: u64,
        transfer_fee: u64,
        escrow_fee: u64,
        notification_fee: u64,
    },
    /// 10
    TransferWithNotification {
        digest: IdentifierDigest,
        record_type: RecordType,
        transaction_id: [u8; 32],
        mint: Pubkey,
        amount: u64,
    },
    /// 11
    CompleteNotification,
}

impl DirectoryInstruction {
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Authorize { .. } => 0,
            Self::SetClaimKey { .. } => 1,
            Self::Assign { .. } => 2,
            Self::Transfer { .. } => 3,
            Self::Update { .. } => 4,
            Self::Delete => 5,
            Self::CreateEscrow { .. } => 6,
            Self::WithdrawEscrow { .. } => 7,
            Self::DeleteEscrow { .. } => 8,
            Self::UpdateConfig { .. } => 9,
            Self::TransferWithNotification { .. } => 10,
            Self::CompleteNotification => 11,
        }
    }

    /// Check field combinations the program would reject.
    ///
    /// Record types must be classified, chain triples ordered, and update
    /// writes must stay inside the routing data limit.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Authorize { record_type, .. }
            | Self::TransferWithNotification { record_type, .. } => {
                record_type.ensure_valid()?;
            }
            Self::CreateEscrow {
                record_type,
                prev_index,
                curr_index,
                next_index,
                ..
            } => {
                record_type.ensure_valid()?;
                EscrowTriple::new(*prev_index, *curr_index, *next_index)?;
            }
            Self::WithdrawEscrow {
                prev_index,
                curr_index,
                next_index,
            }
            | Self::DeleteEscrow {
                prev_index,
                curr_index,
                next_index,
            } => {
                EscrowTriple::new(*prev_index, *curr_index, *next_index)?;
            }
            Self::Update { offset, data } => {
                let end = (*offset as usize).checked_add(data.len());
                if end.map_or(true, |end| end > MAX_ROUTING_DATA_SIZE) {
                    return Err(DirectoryError::UpdateOutOfBounds {
                        offset: *offset,
                        len: data.len(),
                    });
                }
            }
            Self::SetClaimKey { .. }
            | Self::Assign { .. }
            | Self::Transfer { .. }
            | Self::Delete
            | Self::UpdateConfig { .. }
            | Self::CompleteNotification => {}
        }
        Ok(())
    }

    /// Encode after [`validate`](Self::validate); invalid payloads emit nothing.
    pub fn pack(&self) -> Result<Vec<u8>> {
        self.validate()?;
        let mut data = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.serialize(&mut data);
        Ok(data)
    }

    /// Decode instruction data; trailing bytes and invalid field combinations
    /// are rejected.
    pub fn unpack(data: &[u8]) -> Option<Self> {
        Self::try_from_slice(data)
            .ok()
            .filter(|ix| ix.validate().is_ok())
    }
}

fn instruction(
    program_id: &Pubkey,
    accounts: Vec<AccountMeta>,
    payload: DirectoryInstruction,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: payload.pack()?,
    })
}

// ============================================================================
// Name Record Instructions
// ============================================================================

/// Build authorize instruction (creates the name record)
///
/// Accounts:
/// 0. payer (writable, signer)
/// 1. verifier (signer) - attests the identifier was verified
/// 2. name_record (writable)
/// 3. config (writable) - collects fees
/// 4. system_program
pub fn build_authorize(
    program_id: &Pubkey,
    payer: &Pubkey,
    verifier: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
) -> Result<Instruction> {
    let name_record = name_record_address(program_id, record_type, digest)?.address;
    let config = config_address(program_id, ConfigType::Fees)?.address;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(*verifier, true),
            AccountMeta::new(name_record, false),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        DirectoryInstruction::Authorize {
            digest: *digest,
            record_type,
        },
    )
}

/// Build set_claim_key instruction (replaces the record signatory)
///
/// Accounts:
/// 0. signatory (signer) - current signatory
/// 1. name_record (writable)
pub fn build_set_claim_key(
    program_id: &Pubkey,
    signatory: &Pubkey,
    name_record: &Pubkey,
    claim_key: &Pubkey,
) -> Result<Instruction> {
    instruction(
        program_id,
        vec![
            AccountMeta::new_readonly(*signatory, true),
            AccountMeta::new(*name_record, false),
        ],
        DirectoryInstruction::SetClaimKey {
            claim_key: *claim_key,
        },
    )
}

/// Build assign instruction (first owner of an authorized record)
///
/// Accounts:
/// 0. payer (writable, signer)
/// 1. signatory (signer)
/// 2. name_record (writable)
/// 3. config (writable)
/// 4. system_program
pub fn build_assign(
    program_id: &Pubkey,
    payer: &Pubkey,
    signatory: &Pubkey,
    name_record: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction> {
    let config = config_address(program_id, ConfigType::Fees)?.address;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(*signatory, true),
            AccountMeta::new(*name_record, false),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        DirectoryInstruction::Assign { owner: *owner },
    )
}

/// Build transfer instruction
///
/// Accounts:
/// 0. owner (signer)
/// 1. name_record (writable)
pub fn build_transfer(
    program_id: &Pubkey,
    owner: &Pubkey,
    name_record: &Pubkey,
    new_owner: &Pubkey,
) -> Result<Instruction> {
    instruction(
        program_id,
        vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(*name_record, false),
        ],
        DirectoryInstruction::Transfer {
            new_owner: *new_owner,
        },
    )
}

/// Build update instruction (writes routing data at `offset`)
///
/// Accounts:
/// 0. owner (writable, signer) - pays for any reallocation
/// 1. name_record (writable)
/// 2. system_program
pub fn build_update(
    program_id: &Pubkey,
    owner: &Pubkey,
    name_record: &Pubkey,
    offset: u32,
    data: Vec<u8>,
) -> Result<Instruction> {
    instruction(
        program_id,
        vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*name_record, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        DirectoryInstruction::Update { offset, data },
    )
}

/// Build delete instruction (closes the record, rent goes to the owner)
///
/// Accounts:
/// 0. owner (writable, signer)
/// 1. name_record (writable)
pub fn build_delete(
    program_id: &Pubkey,
    owner: &Pubkey,
    name_record: &Pubkey,
) -> Result<Instruction> {
    instruction(
        program_id,
        vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new(*name_record, false),
        ],
        DirectoryInstruction::Delete,
    )
}

// ============================================================================
// Escrow Instructions
// ============================================================================

/// Node accounts for a triple: prev, curr, next.
///
/// `prev == 0` resolves to the root. A terminal `next` still resolves to the
/// PDA of index `u32::MAX`, which never exists; the program ignores it.
fn triple_accounts(
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    triple: &EscrowTriple,
) -> Result<[AccountMeta; 3]> {
    let prev = escrow_node_address(program_id, record_type, digest, triple.prev_index)?.address;
    let curr = escrow_node_address(program_id, record_type, digest, triple.curr_index)?.address;
    let next = escrow_node_address(program_id, record_type, digest, triple.next_index)?.address;
    Ok([
        AccountMeta::new(prev, false),
        AccountMeta::new(curr, false),
        AccountMeta::new(next, false),
    ])
}

/// Build create_escrow instruction
///
/// Accounts:
/// 0. sender (writable, signer)
/// 1. name_record
/// 2. escrow_root (writable) - created on first insert
/// 3. prev_node (writable)
/// 4. curr_node (writable) - node to create
/// 5. next_node (writable)
/// 6. mint
/// 7. config (writable)
/// 8. system_program
pub fn build_create_escrow(
    program_id: &Pubkey,
    sender: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    triple: EscrowTriple,
    mint: &Pubkey,
) -> Result<Instruction> {
    let name_record = name_record_address(program_id, record_type, digest)?.address;
    let root = escrow_root_address(program_id, record_type, digest)?.address;
    let config = config_address(program_id, ConfigType::Fees)?.address;
    let [prev, curr, next] = triple_accounts(program_id, record_type, digest, &triple)?;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*sender, true),
            AccountMeta::new_readonly(name_record, false),
            AccountMeta::new(root, false),
            prev,
            curr,
            next,
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        DirectoryInstruction::CreateEscrow {
            digest: *digest,
            record_type,
            prev_index: triple.prev_index,
            curr_index: triple.curr_index,
            next_index: triple.next_index,
            mint: *mint,
        },
    )
}

/// Build withdraw_escrow instruction (record owner claims the escrow)
///
/// Accounts:
/// 0. owner (writable, signer)
/// 1. name_record
/// 2. prev_node (writable)
/// 3. curr_node (writable) - closed
/// 4. next_node (writable)
/// 5. sender (writable) - receives the node's rent
pub fn build_withdraw_escrow(
    program_id: &Pubkey,
    owner: &Pubkey,
    sender: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    triple: EscrowTriple,
) -> Result<Instruction> {
    let name_record = name_record_address(program_id, record_type, digest)?.address;
    let [prev, curr, next] = triple_accounts(program_id, record_type, digest, &triple)?;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*owner, true),
            AccountMeta::new_readonly(name_record, false),
            prev,
            curr,
            next,
            AccountMeta::new(*sender, false),
        ],
        DirectoryInstruction::WithdrawEscrow {
            prev_index: triple.prev_index,
            curr_index: triple.curr_index,
            next_index: triple.next_index,
        },
    )
}

/// Build delete_escrow instruction (sender cancels an unclaimed escrow)
///
/// Accounts:
/// 0. sender (writable, signer)
/// 1. name_record
/// 2. prev_node (writable)
/// 3. curr_node (writable) - closed
/// 4. next_node (writable)
pub fn build_delete_escrow(
    program_id: &Pubkey,
    sender: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    triple: EscrowTriple,
) -> Result<Instruction> {
    let name_record = name_record_address(program_id, record_type, digest)?.address;
    let [prev, curr, next] = triple_accounts(program_id, record_type, digest, &triple)?;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*sender, true),
            AccountMeta::new_readonly(name_record, false),
            prev,
            curr,
            next,
        ],
        DirectoryInstruction::DeleteEscrow {
            prev_index: triple.prev_index,
            curr_index: triple.curr_index,
            next_index: triple.next_index,
        },
    )
}

// ============================================================================
// Config Instructions
// ============================================================================

/// Build update_config instruction
///
/// Accounts:
/// 0. authority (writable, signer) - pays if the config is created
/// 1. config (writable)
/// 2. system_program
pub fn build_update_config(
    program_id: &Pubkey,
    authority: &Pubkey,
    fees: &FeeSchedule,
) -> Result<Instruction> {
    let config = config_address(program_id, ConfigType::Fees)?.address;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        DirectoryInstruction::UpdateConfig {
            verify_fee: fees.verify_fee,
            assign_fee: fees.assign_fee,
            transfer_fee: fees.transfer_fee,
            escrow_fee: fees.escrow_fee,
            notification_fee: fees.notification_fee,
        },
    )
}

// ============================================================================
// Notification Instructions
// ============================================================================

/// Build transfer_with_notification instruction
///
/// Accounts:
/// 0. sender (writable, signer)
/// 1. name_record
/// 2. notification_request (writable) - created
/// 3. config (writable)
/// 4. system_program
pub fn build_transfer_with_notification(
    program_id: &Pubkey,
    sender: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    transaction_id: [u8; 32],
    mint: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    let name_record = name_record_address(program_id, record_type, digest)?.address;
    let request = notification_request_address(program_id, record_type, &transaction_id)?.address;
    let config = config_address(program_id, ConfigType::Fees)?.address;

    instruction(
        program_id,
        vec![
            AccountMeta::new(*sender, true),
            AccountMeta::new_readonly(name_record, false),
            AccountMeta::new(request, false),
            AccountMeta::new(config, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        DirectoryInstruction::TransferWithNotification {
            digest: *digest,
            record_type,
            transaction_id,
            mint: *mint,
            amount,
        },
    )
}

/// Build complete_notification instruction (closes the request, refunds the sender)
///
/// Accounts:
/// 0. authority (signer) - config authority
/// 1. config
/// 2. notification_request (writable)
/// 3. sender (writable)
pub fn build_complete_notification(
    program_id: &Pubkey,
    authority: &Pubkey,
    record_type: RecordType,
    transaction_id: &[u8; 32],
    sender: &Pubkey,
) -> Result<Instruction> {
    let config = config_address(program_id, ConfigType::Fees)?.address;
    let request = notification_request_address(program_id, record_type, transaction_id)?.address;

    instruction(
        program_id,
        vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new_readonly(config, false),
            AccountMeta::new(request, false),
            AccountMeta::new(*sender, false),
        ],
        DirectoryInstruction::CompleteNotification,
    )
}
