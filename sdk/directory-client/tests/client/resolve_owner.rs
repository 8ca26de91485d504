//! Owner resolution and client-level escrow preparation

use std::sync::Arc;

use anchor_lang::prelude::Pubkey;
use directory_client::constants::TERMINAL_INDEX;
use directory_client::instruction::DirectoryInstruction;
use directory_client::pda::name_record_address;
use directory_client::state::{AccountLayout, AccountState};
use directory_client::{
    normalize, ClientConfig, DirectoryClient, DirectoryError, LedgerError, RecordType,
};
use solana_sdk::system_program;

use crate::common::{
    accounts::{name_record, put_name_record, seed_chain},
    init_tracing,
    ledger::MockLedger,
    phone, test_program_id,
};

fn client(ledger: Arc<MockLedger>) -> DirectoryClient<MockLedger> {
    DirectoryClient::with_config(ledger, ClientConfig::with_program_id(test_program_id()))
}

#[tokio::test]
async fn test_resolves_assigned_owner() {
    init_tracing();
    let ledger = Arc::new(MockLedger::new());
    let (identifier, digest) = phone("+1 (415) 555-0100");
    let owner = Pubkey::new_unique();
    put_name_record(
        &ledger,
        &test_program_id(),
        &digest,
        &name_record(RecordType::Phone, 0b0110, owner),
    );

    let resolved = client(ledger).resolve_owner(&identifier).await.unwrap();
    assert_eq!(resolved, owner);
}

/// Differently formatted input reaches the same record
#[tokio::test]
async fn test_equivalent_inputs_share_record() {
    let ledger = Arc::new(MockLedger::new());
    let client = client(ledger);

    let a = client.name_record_address(&normalize("+14155550100")).unwrap();
    let b = client.name_record_address(&normalize(" +1 415-555-0100 ")).unwrap();
    assert_eq!(a, b);

    let upper = client.name_record_address(&normalize("Alice@Example.com")).unwrap();
    let lower = client.name_record_address(&normalize("alice@example.com")).unwrap();
    assert_eq!(upper, lower);
}

#[tokio::test]
async fn test_absent_record() {
    let ledger = Arc::new(MockLedger::new());
    let (identifier, digest) = phone("+14155550100");
    let expected = name_record_address(&test_program_id(), RecordType::Phone, &digest)
        .unwrap()
        .address;

    let err = client(ledger).resolve_owner(&identifier).await.unwrap_err();
    assert!(
        matches!(err, DirectoryError::AccountAbsent(address) if address == expected),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn test_record_owned_by_other_program() {
    let ledger = Arc::new(MockLedger::new());
    let (identifier, digest) = phone("+14155550100");
    let address = name_record_address(&test_program_id(), RecordType::Phone, &digest)
        .unwrap()
        .address;
    let imposter = Pubkey::new_unique();
    let record = name_record(RecordType::Phone, 0, Pubkey::new_unique());
    ledger.insert(address, imposter, record.encode());

    let client = client(ledger);
    let err = client.resolve_owner(&identifier).await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::AccountNotOwnedByProgram { owner, .. } if owner == imposter
    ));

    let state = client.name_record(&identifier).await.unwrap();
    assert_eq!(state, AccountState::WrongOwner(imposter));
}

/// Both the all-zero key and the system program id mean "no owner"
#[tokio::test]
async fn test_unowned_encodings() {
    let (identifier, digest) = phone("+14155550100");

    for unowned in [Pubkey::new_from_array([0u8; 32]), system_program::ID] {
        let ledger = Arc::new(MockLedger::new());
        put_name_record(
            &ledger,
            &test_program_id(),
            &digest,
            &name_record(RecordType::Phone, 0b0110, unowned),
        );

        let err = client(ledger).resolve_owner(&identifier).await.unwrap_err();
        assert!(matches!(err, DirectoryError::UnownedRecord), "{}", unowned);
    }
}

#[tokio::test]
async fn test_old_version_rejected() {
    let ledger = Arc::new(MockLedger::new());
    let (identifier, digest) = phone("+14155550100");
    let mut record = name_record(RecordType::Phone, 0b0110, Pubkey::new_unique());
    record.version_major = 0;
    put_name_record(&ledger, &test_program_id(), &digest, &record);

    let err = client(ledger).resolve_owner(&identifier).await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::VersionTooOld { found: 0, min: 1 }
    ));
}

#[tokio::test]
async fn test_invalid_identifier_rejected_before_reading() {
    let ledger = Arc::new(MockLedger::new());
    let identifier = normalize("not an identifier");
    assert!(!identifier.is_valid());

    let err = client(ledger.clone())
        .resolve_owner(&identifier)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::InvalidRecordType));
    assert_eq!(ledger.reads(), 0);
}

#[tokio::test]
async fn test_ledger_failure_surfaces() {
    let ledger = Arc::new(MockLedger::new());
    ledger.go_offline();
    let (identifier, _) = phone("+14155550100");

    let err = client(ledger).resolve_owner(&identifier).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Ledger(LedgerError::Timeout)));
}

/// Slot discovery and instruction building agree on the triple
#[tokio::test]
async fn test_prepare_create_escrow() {
    let ledger = Arc::new(MockLedger::new());
    let program_id = test_program_id();
    let (identifier, digest) = phone("+14155550100");
    seed_chain(&ledger, &program_id, RecordType::Phone, &digest, &[1, 2], Pubkey::new_unique());
    let client = client(ledger);

    let sender = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let (ix, slot) = client
        .prepare_create_escrow(&sender, &identifier, &mint)
        .await
        .unwrap();

    assert_eq!(
        (slot.prev_index, slot.curr_index, slot.next_index),
        (2, 3, TERMINAL_INDEX)
    );
    assert_eq!(ix.program_id, program_id);
    assert_eq!(ix.accounts[4].pubkey, slot.address);
    assert_eq!(
        DirectoryInstruction::unpack(&ix.data),
        Some(DirectoryInstruction::CreateEscrow {
            digest,
            record_type: RecordType::Phone,
            prev_index: 2,
            curr_index: 3,
            next_index: TERMINAL_INDEX,
            mint,
        })
    );

    let listed = client.list_escrows(&identifier, Some(&sender)).await.unwrap();
    assert!(listed.is_empty(), "preparing does not write anything");
}
