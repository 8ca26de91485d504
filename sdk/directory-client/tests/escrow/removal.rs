//! Withdraw and delete instructions built from walked chain nodes

use std::sync::Arc;

use anchor_lang::prelude::Pubkey;
use directory_client::constants::TERMINAL_INDEX;
use directory_client::escrow::EscrowTriple;
use directory_client::instruction::{
    build_delete_escrow, build_withdraw_escrow, DirectoryInstruction,
};
use directory_client::pda::escrow_node_address;
use directory_client::{ClientConfig, DirectoryClient, RecordType};

use crate::common::{accounts::seed_chain, ledger::MockLedger, phone, test_program_id};

const PHONE: RecordType = RecordType::Phone;

/// Walk [1 -> 2 -> 3] through the client and cancel the middle node
#[tokio::test]
async fn test_delete_middle_node_from_walk() {
    let ledger = Arc::new(MockLedger::new());
    let program_id = test_program_id();
    let (identifier, digest) = phone("+14155550100");
    let sender = Pubkey::new_unique();
    seed_chain(&ledger, &program_id, PHONE, &digest, &[1, 2, 3], sender);
    let client = DirectoryClient::with_config(ledger, ClientConfig::with_program_id(program_id));

    let mut walker = client.escrows(&identifier).unwrap();
    let mut middle = None;
    while let Some(node) = walker.next().await.unwrap() {
        if node.index == 2 {
            middle = Some(node);
        }
    }
    let middle = middle.expect("node 2 walked");
    assert!(!middle.is_last());

    let triple = EscrowTriple::of_node(&middle).unwrap();
    assert_eq!(
        triple,
        EscrowTriple {
            prev_index: 1,
            curr_index: 2,
            next_index: 3,
        }
    );

    let ix = build_delete_escrow(&program_id, &sender, PHONE, &digest, triple).unwrap();
    let address = |index| {
        escrow_node_address(&program_id, PHONE, &digest, index)
            .unwrap()
            .address
    };
    assert_eq!(ix.accounts[2].pubkey, address(1));
    assert_eq!(ix.accounts[3].pubkey, address(2));
    assert_eq!(ix.accounts[4].pubkey, address(3));
    assert_eq!(
        DirectoryInstruction::unpack(&ix.data),
        Some(DirectoryInstruction::DeleteEscrow {
            prev_index: 1,
            curr_index: 2,
            next_index: 3,
        })
    );
}

/// The tail node links to the terminal index
#[tokio::test]
async fn test_withdraw_last_node() {
    let ledger = Arc::new(MockLedger::new());
    let program_id = test_program_id();
    let (identifier, digest) = phone("+14155550100");
    let sender = Pubkey::new_unique();
    seed_chain(&ledger, &program_id, PHONE, &digest, &[4, 9], sender);
    let client = DirectoryClient::with_config(ledger, ClientConfig::with_program_id(program_id));

    let nodes = client.list_escrows(&identifier, None).await.unwrap();
    let last = nodes.last().expect("chain has nodes");
    assert!(last.is_last());
    assert!(!nodes[0].is_last());

    let triple = EscrowTriple::of_node(last).unwrap();
    assert_eq!(
        (triple.prev_index, triple.curr_index, triple.next_index),
        (4, 9, TERMINAL_INDEX)
    );

    let owner = Pubkey::new_unique();
    let ix = build_withdraw_escrow(&program_id, &owner, &last.sender, PHONE, &digest, triple)
        .unwrap();
    assert_eq!(ix.accounts[0].pubkey, owner);
    assert_eq!(ix.accounts.last().unwrap().pubkey, sender);
    assert_eq!(ix.data[0], 7);
}

/// The first node's predecessor is the root at index 0
#[tokio::test]
async fn test_first_node_triple_starts_at_root() {
    let ledger = Arc::new(MockLedger::new());
    let program_id = test_program_id();
    let (identifier, digest) = phone("+14155550100");
    seed_chain(&ledger, &program_id, PHONE, &digest, &[1], Pubkey::new_unique());
    let client = DirectoryClient::with_config(ledger, ClientConfig::with_program_id(program_id));

    let mut walker = client.escrows(&identifier).unwrap();
    let only = walker.next().await.unwrap().expect("one node");
    assert!(walker.next().await.unwrap().is_none());

    let triple = EscrowTriple::of_node(&only).unwrap();
    assert_eq!(
        (triple.prev_index, triple.curr_index, triple.next_index),
        (0, 1, TERMINAL_INDEX)
    );
}
