use anchor_lang::prelude::Pubkey;
use tracing::{debug, warn};

use crate::constants::{
    ESCROW_NODE_SIZE, MAX_ROUTING_DATA_SIZE, NAME_RECORD_HEADER_SIZE, NOTIFICATION_REQUEST_SIZE,
};
use crate::errors::{DirectoryError, Result};
use crate::ledger::{fetch_account, LedgerReader};
use crate::pda::{config_address, ConfigType};
use crate::state::{AccountState, FeeSchedule, NameRecord, RecordType, StateFlags};

/// Operation whose cost is being estimated
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    Authorize,
    SetClaimKey,
    Assign,
    Transfer,
    Update,
    Delete,
    CreateEscrow,
    WithdrawEscrow,
    DeleteEscrow,
    UpdateConfig,
    TransferWithNotification,
    CompleteNotification,
}

/// Lamports an operation will cost the payer
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CostEstimate {
    /// Program fee
    pub fee: u64,
    /// Rent-exempt balance for accounts the operation creates or grows
    pub deposit: u64,
}

impl CostEstimate {
    pub fn total(&self) -> u64 {
        self.fee.saturating_add(self.deposit)
    }
}

impl FeeSchedule {
    /// Fee for `operation`, skipping components the record has already paid.
    pub fn fee_for(&self, operation: Operation, prepaid: &StateFlags) -> u64 {
        let verify = if prepaid.paid_to_verify { 0 } else { self.verify_fee };
        let assign = if prepaid.paid_to_assign { 0 } else { self.assign_fee };

        match operation {
            Operation::Authorize => verify.saturating_add(assign),
            Operation::Assign => assign,
            Operation::Transfer => self.transfer_fee,
            Operation::CreateEscrow => self.escrow_fee,
            Operation::TransferWithNotification => self.notification_fee,
            Operation::SetClaimKey
            | Operation::Update
            | Operation::Delete
            | Operation::WithdrawEscrow
            | Operation::DeleteEscrow
            | Operation::UpdateConfig
            | Operation::CompleteNotification => 0,
        }
    }
}

/// Read the fee schedule, falling back to the compiled-in default.
pub async fn load_fee_schedule<R: LedgerReader + ?Sized>(
    reader: &R,
    program_id: &Pubkey,
) -> Result<FeeSchedule> {
    let address = config_address(program_id, ConfigType::Fees)?.address;
    match fetch_account::<FeeSchedule, R>(reader, program_id, &address).await? {
        AccountState::Present(schedule) => Ok(schedule),
        AccountState::Absent => {
            warn!(%address, "config account absent, using default fee schedule");
            Ok(FeeSchedule::default())
        }
        AccountState::WrongOwner(owner) => {
            warn!(%address, %owner, "config account has foreign owner, using default fee schedule");
            Ok(FeeSchedule::default())
        }
    }
}

/// Estimate fee and deposit for an operation.
///
/// `payload_size` is the routing data length the record will hold after
/// `Authorize` or `Update`; other operations ignore it. `existing` is the
/// current name record, if any; its paid flags zero the matching fees.
/// An `Update` without `existing` is priced as a full record of the new size.
pub async fn estimate_cost<R: LedgerReader + ?Sized>(
    reader: &R,
    program_id: &Pubkey,
    operation: Operation,
    record_type: RecordType,
    payload_size: usize,
    existing: Option<&NameRecord>,
) -> Result<CostEstimate> {
    record_type.ensure_valid()?;
    if matches!(operation, Operation::Authorize | Operation::Update)
        && payload_size > MAX_ROUTING_DATA_SIZE
    {
        return Err(DirectoryError::UpdateOutOfBounds {
            offset: 0,
            len: payload_size,
        });
    }

    let schedule = load_fee_schedule(reader, program_id).await?;
    let prepaid = existing.map(|record| record.state).unwrap_or_default();
    let fee = schedule.fee_for(operation, &prepaid);

    let new_record_size = NAME_RECORD_HEADER_SIZE.saturating_add(payload_size);
    let deposit = match (operation, existing) {
        (Operation::Authorize, None) | (Operation::Update, None) => {
            reader.minimum_balance_for_rent_exemption(new_record_size).await?
        }
        (Operation::Update, Some(record)) if new_record_size > record.size() => {
            let grown = reader.minimum_balance_for_rent_exemption(new_record_size).await?;
            let current = reader.minimum_balance_for_rent_exemption(record.size()).await?;
            grown.saturating_sub(current)
        }
        (Operation::CreateEscrow, _) => {
            reader.minimum_balance_for_rent_exemption(ESCROW_NODE_SIZE).await?
        }
        (Operation::TransferWithNotification, _) => {
            reader
                .minimum_balance_for_rent_exemption(NOTIFICATION_REQUEST_SIZE)
                .await?
        }
        _ => 0,
    };

    let estimate = CostEstimate { fee, deposit };
    debug!(?operation, ?record_type, fee, deposit, "estimated cost");
    Ok(estimate)
}
