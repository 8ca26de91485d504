//! Escrow chain traversal and slot allocation.
//!
//! Each `(digest, record_type)` owns a singly linked list of escrow nodes kept
//! in ascending index order and anchored by a root at index 0. Links are
//! indices, and every index maps to a PDA, so walking the chain is a sequence
//! of dependent account reads. The client never writes the chain; it only
//! computes the `prev / curr / next` triple the program's insert and delete
//! instructions check atomically.

use anchor_lang::prelude::Pubkey;
use tracing::{debug, error};

use crate::constants::{ESCROW_ROOT_INDEX, FIRST_ESCROW_INDEX, TERMINAL_INDEX};
use crate::errors::{DirectoryError, Result};
use crate::hasher::IdentifierDigest;
use crate::ledger::{fetch_account, LedgerReader};
use crate::pda::{escrow_node_address, escrow_root_address};
use crate::state::{AccountState, EscrowNode, EscrowRoot, RecordType};

// ============================================================================
// Chain Triple
// ============================================================================

/// Position of a node relative to its neighbours
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EscrowTriple {
    pub prev_index: u32,
    pub curr_index: u32,
    pub next_index: u32,
}

impl EscrowTriple {
    /// Validate a triple before it is encoded into an instruction.
    pub fn new(prev_index: u32, curr_index: u32, next_index: u32) -> Result<Self> {
        if curr_index < FIRST_ESCROW_INDEX || prev_index > curr_index || next_index < curr_index {
            return Err(DirectoryError::InvalidChainTriple {
                prev: prev_index,
                curr: curr_index,
                next: next_index,
            });
        }
        Ok(Self {
            prev_index,
            curr_index,
            next_index,
        })
    }

    /// Triple for removing an existing node
    pub fn of_node(node: &EscrowNode) -> Result<Self> {
        Self::new(node.prev_index, node.index, node.next_index)
    }
}

/// Where a new escrow node must be inserted
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InsertionSlot {
    pub prev_index: u32,
    pub curr_index: u32,
    pub next_index: u32,
    /// PDA of the node to create at `curr_index`
    pub address: Pubkey,
    pub bump: u8,
}

impl InsertionSlot {
    pub fn triple(&self) -> Result<EscrowTriple> {
        EscrowTriple::new(self.prev_index, self.curr_index, self.next_index)
    }
}

fn corrupt(index: u32, reason: impl Into<String>) -> DirectoryError {
    let reason = reason.into();
    error!(index, %reason, "escrow chain corrupt");
    DirectoryError::CorruptChain { index, reason }
}

// ============================================================================
// Node Access
// ============================================================================

/// Fetch the root, `None` if no chain exists yet.
async fn fetch_root<R: LedgerReader + ?Sized>(
    reader: &R,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
) -> Result<Option<EscrowRoot>> {
    let address = escrow_root_address(program_id, record_type, digest)?.address;
    match fetch_account::<EscrowRoot, R>(reader, program_id, &address).await? {
        AccountState::Present(root) => {
            if root.next_index == ESCROW_ROOT_INDEX {
                return Err(corrupt(ESCROW_ROOT_INDEX, "root links to itself"));
            }
            Ok(Some(root))
        }
        AccountState::Absent => Ok(None),
        AccountState::WrongOwner(owner) => {
            Err(DirectoryError::AccountNotOwnedByProgram { address, owner })
        }
    }
}

/// Fetch a node the chain says must exist and check its links.
async fn fetch_linked_node<R: LedgerReader + ?Sized>(
    reader: &R,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    index: u32,
    expected_prev: u32,
) -> Result<EscrowNode> {
    let address = escrow_node_address(program_id, record_type, digest, index)?.address;
    let node = match fetch_account::<EscrowNode, R>(reader, program_id, &address).await? {
        AccountState::Present(node) => node,
        AccountState::Absent => return Err(corrupt(index, "linked node missing")),
        AccountState::WrongOwner(owner) => {
            return Err(DirectoryError::AccountNotOwnedByProgram { address, owner })
        }
    };

    if node.index != index {
        return Err(corrupt(index, format!("node records index {}", node.index)));
    }
    if node.prev_index != expected_prev {
        return Err(corrupt(
            index,
            format!("prev_index {} but reached from {}", node.prev_index, expected_prev),
        ));
    }
    if !node.is_linked_consistently() {
        return Err(corrupt(
            index,
            format!("links out of order: {} < {} < {}", node.prev_index, node.index, node.next_index),
        ));
    }

    debug!(index, next = node.next_index, "visited escrow node");
    Ok(node)
}

// ============================================================================
// Slot Allocation
// ============================================================================

/// Find the lowest free index in the chain and its neighbours.
///
/// - no root: first-ever node, `{prev: 0, curr: 1, next: MAX}`
/// - root links past 1: insert right after the root
/// - otherwise walk from 1 until a node's `next_index` skips the following index
pub async fn find_insertion_slot<R: LedgerReader + ?Sized>(
    reader: &R,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    max_walk: u32,
) -> Result<InsertionSlot> {
    let slot = |prev_index: u32, curr_index: u32, next_index: u32| -> Result<InsertionSlot> {
        let derived = escrow_node_address(program_id, record_type, digest, curr_index)?;
        debug!(prev_index, curr_index, next_index, "escrow insertion slot");
        Ok(InsertionSlot {
            prev_index,
            curr_index,
            next_index,
            address: derived.address,
            bump: derived.bump,
        })
    };

    let Some(root) = fetch_root(reader, program_id, record_type, digest).await? else {
        return slot(ESCROW_ROOT_INDEX, FIRST_ESCROW_INDEX, TERMINAL_INDEX);
    };

    if root.next_index > FIRST_ESCROW_INDEX {
        return slot(ESCROW_ROOT_INDEX, FIRST_ESCROW_INDEX, root.next_index);
    }

    let mut index = FIRST_ESCROW_INDEX;
    let mut prev = ESCROW_ROOT_INDEX;
    let mut walked = 0u32;

    loop {
        walked += 1;
        if walked > max_walk {
            return Err(DirectoryError::ChainWalkLimit { limit: max_walk });
        }

        let node = fetch_linked_node(reader, program_id, record_type, digest, index, prev).await?;

        let candidate = index + 1;
        if candidate == TERMINAL_INDEX {
            return Err(DirectoryError::EscrowChainFull);
        }
        if node.next_index > candidate {
            return slot(node.index, candidate, node.next_index);
        }

        // next_index > index and not > index + 1, so the chain is dense here
        prev = index;
        index = candidate;
    }
}

// ============================================================================
// Chain Listing
// ============================================================================

/// Lazy walk over an escrow chain, root to terminal.
///
/// Each call to [`EscrowWalker::next`] issues a fresh read. A failed walk stays
/// finished; start a new walker to retry.
pub struct EscrowWalker<'a, R: LedgerReader + ?Sized> {
    reader: &'a R,
    program_id: Pubkey,
    record_type: RecordType,
    digest: IdentifierDigest,
    next_index: Option<u32>,
    prev_index: u32,
    walked: u32,
    max_walk: u32,
    finished: bool,
}

impl<'a, R: LedgerReader + ?Sized> EscrowWalker<'a, R> {
    pub fn new(
        reader: &'a R,
        program_id: Pubkey,
        record_type: RecordType,
        digest: IdentifierDigest,
        max_walk: u32,
    ) -> Self {
        Self {
            reader,
            program_id,
            record_type,
            digest,
            next_index: None,
            prev_index: ESCROW_ROOT_INDEX,
            walked: 0,
            max_walk,
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Result<Option<EscrowNode>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.advance().await;
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    async fn advance(&mut self) -> Result<Option<EscrowNode>> {
        let index = match self.next_index {
            Some(index) => index,
            None => {
                match fetch_root(self.reader, &self.program_id, self.record_type, &self.digest)
                    .await?
                {
                    Some(root) => root.next_index,
                    None => return Ok(None),
                }
            }
        };

        if index == TERMINAL_INDEX {
            return Ok(None);
        }

        self.walked += 1;
        if self.walked > self.max_walk {
            return Err(DirectoryError::ChainWalkLimit {
                limit: self.max_walk,
            });
        }

        let node = fetch_linked_node(
            self.reader,
            &self.program_id,
            self.record_type,
            &self.digest,
            index,
            self.prev_index,
        )
        .await?;

        self.prev_index = node.index;
        self.next_index = Some(node.next_index);
        Ok(Some(node))
    }
}

/// Collect the chain in ascending index order, optionally only one sender's nodes.
pub async fn list_escrows<R: LedgerReader + ?Sized>(
    reader: &R,
    program_id: &Pubkey,
    record_type: RecordType,
    digest: &IdentifierDigest,
    sender_filter: Option<&Pubkey>,
    max_walk: u32,
) -> Result<Vec<EscrowNode>> {
    let mut walker = EscrowWalker::new(reader, *program_id, record_type, *digest, max_walk);
    let mut nodes = Vec::new();

    while let Some(node) = walker.next().await? {
        if sender_filter.map_or(true, |sender| node.sender == *sender) {
            nodes.push(node);
        }
    }

    debug!(count = nodes.len(), "listed escrows");
    Ok(nodes)
}
