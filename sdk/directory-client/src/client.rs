//! High-level client over an injected ledger reader.
//!
//! `DirectoryClient` holds no mutable state: an `Arc` to the reader and an
//! immutable config. It can be shared across tasks freely; every call derives
//! its addresses again and issues fresh reads.

use std::sync::Arc;

use anchor_lang::prelude::Pubkey;
use solana_program::instruction::Instruction;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::errors::{DirectoryError, Result};
use crate::escrow::{self, EscrowWalker, InsertionSlot};
use crate::fees::{self, CostEstimate, Operation};
use crate::hasher::IdentifierDigest;
use crate::identifier::Identifier;
use crate::instruction::build_create_escrow;
use crate::ledger::{fetch_account, LedgerReader};
use crate::pda::{self, DerivedAddress};
use crate::state::{
    AccountState, EscrowNode, FeeSchedule, NameRecord, NotificationRequest, RecordType,
};

pub struct DirectoryClient<R: LedgerReader + ?Sized> {
    reader: Arc<R>,
    config: ClientConfig,
}

impl<R: LedgerReader + ?Sized> DirectoryClient<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self::with_config(reader, ClientConfig::default())
    }

    pub fn with_config(reader: Arc<R>, config: ClientConfig) -> Self {
        Self { reader, config }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.config.program_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn key(identifier: &Identifier) -> Result<(RecordType, IdentifierDigest)> {
        Ok((identifier.record_type.ensure_valid()?, identifier.digest()?))
    }

    // ========================================================================
    // Name Records
    // ========================================================================

    pub fn name_record_address(&self, identifier: &Identifier) -> Result<DerivedAddress> {
        let (record_type, digest) = Self::key(identifier)?;
        pda::name_record_address(self.program_id(), record_type, &digest)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn name_record(&self, identifier: &Identifier) -> Result<AccountState<NameRecord>> {
        let address = self.name_record_address(identifier)?.address;
        fetch_account(&*self.reader, self.program_id(), &address).await
    }

    /// Owner of a valid assignment for `identifier`.
    ///
    /// Fails with `AccountAbsent`, `AccountNotOwnedByProgram`, `VersionTooOld`
    /// or `UnownedRecord` when there is none.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve_owner(&self, identifier: &Identifier) -> Result<Pubkey> {
        let address = self.name_record_address(identifier)?.address;
        let record = fetch_account::<NameRecord, R>(&*self.reader, self.program_id(), &address)
            .await?
            .require(&address)?;
        record.assigned_owner(self.config.min_version_major)
    }

    // ========================================================================
    // Escrow
    // ========================================================================

    #[instrument(skip(self), level = "debug")]
    pub async fn find_insertion_slot(&self, identifier: &Identifier) -> Result<InsertionSlot> {
        let (record_type, digest) = Self::key(identifier)?;
        escrow::find_insertion_slot(
            &*self.reader,
            self.program_id(),
            record_type,
            &digest,
            self.config.max_chain_walk,
        )
        .await
    }

    /// Lazy walk over the identifier's escrow chain
    pub fn escrows(&self, identifier: &Identifier) -> Result<EscrowWalker<'_, R>> {
        let (record_type, digest) = Self::key(identifier)?;
        Ok(EscrowWalker::new(
            &*self.reader,
            self.config.program_id,
            record_type,
            digest,
            self.config.max_chain_walk,
        ))
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn list_escrows(
        &self,
        identifier: &Identifier,
        sender: Option<&Pubkey>,
    ) -> Result<Vec<EscrowNode>> {
        let (record_type, digest) = Self::key(identifier)?;
        escrow::list_escrows(
            &*self.reader,
            self.program_id(),
            record_type,
            &digest,
            sender,
            self.config.max_chain_walk,
        )
        .await
    }

    /// Find the next free slot and build the matching create_escrow instruction.
    ///
    /// Another writer may take the slot before submission; the program rejects
    /// the stale triple and the caller should build again.
    pub async fn prepare_create_escrow(
        &self,
        sender: &Pubkey,
        identifier: &Identifier,
        mint: &Pubkey,
    ) -> Result<(Instruction, InsertionSlot)> {
        let (record_type, digest) = Self::key(identifier)?;
        let slot = self.find_insertion_slot(identifier).await?;
        let ix = build_create_escrow(
            self.program_id(),
            sender,
            record_type,
            &digest,
            slot.triple()?,
            mint,
        )?;
        Ok((ix, slot))
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub async fn notification_request(
        &self,
        record_type: RecordType,
        transaction_id: &[u8; 32],
    ) -> Result<AccountState<NotificationRequest>> {
        let address =
            pda::notification_request_address(self.program_id(), record_type, transaction_id)?
                .address;
        fetch_account(&*self.reader, self.program_id(), &address).await
    }

    // ========================================================================
    // Fees
    // ========================================================================

    pub async fn fee_schedule(&self) -> Result<FeeSchedule> {
        fees::load_fee_schedule(&*self.reader, self.program_id()).await
    }

    #[instrument(skip(self, existing), level = "debug")]
    pub async fn estimate_cost(
        &self,
        operation: Operation,
        record_type: RecordType,
        payload_size: usize,
        existing: Option<&NameRecord>,
    ) -> Result<CostEstimate> {
        fees::estimate_cost(
            &*self.reader,
            self.program_id(),
            operation,
            record_type,
            payload_size,
            existing,
        )
        .await
    }

    /// Estimate against the identifier's current name record, read from the
    /// ledger, so its paid flags and size always apply.
    ///
    /// A missing record is priced as new. A record held by another program is
    /// an error.
    #[instrument(skip(self), level = "debug")]
    pub async fn estimate_cost_for(
        &self,
        operation: Operation,
        identifier: &Identifier,
        payload_size: usize,
    ) -> Result<CostEstimate> {
        let address = self.name_record_address(identifier)?.address;
        let state =
            fetch_account::<NameRecord, R>(&*self.reader, self.program_id(), &address).await?;
        let existing = match state {
            AccountState::Present(record) => Some(record),
            AccountState::Absent => None,
            AccountState::WrongOwner(owner) => {
                return Err(DirectoryError::AccountNotOwnedByProgram { address, owner })
            }
        };

        self.estimate_cost(
            operation,
            identifier.record_type,
            payload_size,
            existing.as_ref(),
        )
        .await
    }
}
