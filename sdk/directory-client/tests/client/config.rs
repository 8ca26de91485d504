//! Client configuration loading

use anchor_lang::prelude::Pubkey;
use directory_client::constants::{DEFAULT_MAX_CHAIN_WALK, MIN_VERSION_MAJOR};
use directory_client::ClientConfig;

#[test]
fn test_empty_document_gives_defaults() {
    let config: ClientConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.program_id, directory_client::ID);
    assert_eq!(config.min_version_major, MIN_VERSION_MAJOR);
    assert_eq!(config.max_chain_walk, DEFAULT_MAX_CHAIN_WALK);
}

#[test]
fn test_program_id_parsed_from_base58() {
    let program_id = Pubkey::new_unique();
    let json = format!(r#"{{ "program_id": "{}", "max_chain_walk": 16 }}"#, program_id);

    let config: ClientConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(config.program_id, program_id);
    assert_eq!(config.max_chain_walk, 16);
    assert_eq!(config.min_version_major, MIN_VERSION_MAJOR);
}

#[test]
fn test_invalid_program_id_rejected() {
    let result = serde_json::from_str::<ClientConfig>(r#"{ "program_id": "not-a-key" }"#);
    assert!(result.is_err());
}

#[test]
fn test_serialized_config_reads_back() {
    let config = ClientConfig {
        min_version_major: 2,
        ..ClientConfig::with_program_id(Pubkey::new_unique())
    };

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(&config.program_id.to_string()));
    assert_eq!(serde_json::from_str::<ClientConfig>(&json).unwrap(), config);
}
