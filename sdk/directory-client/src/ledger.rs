//! Ledger reader port.
//!
//! The client never talks to an RPC node itself. Callers inject a
//! [`LedgerReader`]; timeouts, retries and cancellation all live there.

use anchor_lang::prelude::Pubkey;
use async_trait::async_trait;
use tracing::debug;

use crate::errors::{LedgerError, Result};
use crate::state::{AccountLayout, AccountState};

/// Raw account as returned by the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerAccount {
    /// Program that owns the account
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

/// Read access to the ledger (driven port)
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Fetch an account, `None` if it does not exist
    async fn get_account(
        &self,
        address: &Pubkey,
    ) -> std::result::Result<Option<LedgerAccount>, LedgerError>;

    /// Minimum lamports keeping an account of `data_len` bytes alive
    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> std::result::Result<u64, LedgerError>;
}

/// Fetch and decode a directory account.
///
/// Missing accounts and undecodable bytes are `Absent`; accounts owned by any
/// other program are `WrongOwner`. Only ledger I/O failures are errors.
pub async fn fetch_account<T, R>(
    reader: &R,
    program_id: &Pubkey,
    address: &Pubkey,
) -> Result<AccountState<T>>
where
    T: AccountLayout,
    R: LedgerReader + ?Sized,
{
    let Some(account) = reader.get_account(address).await? else {
        debug!(%address, kind = T::KIND, "account absent");
        return Ok(AccountState::Absent);
    };

    if account.owner != *program_id {
        debug!(%address, owner = %account.owner, kind = T::KIND, "account has foreign owner");
        return Ok(AccountState::WrongOwner(account.owner));
    }

    match T::decode(&account.data) {
        Some(decoded) => Ok(AccountState::Present(decoded)),
        None => {
            debug!(%address, len = account.data.len(), kind = T::KIND, "account data does not decode");
            Ok(AccountState::Absent)
        }
    }
}
