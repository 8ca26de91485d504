//! Client SDK for the identifier directory program.
//!
//! The program maps a hashed public identifier (phone number, email, handle)
//! to an owner, and holds escrowed payments for identifiers that have not been
//! claimed yet. This crate derives the program's addresses, encodes its
//! instructions, decodes its accounts and walks its escrow chains. Reads go
//! through an injected [`ledger::LedgerReader`]; signing and submission stay
//! with the caller.

use anchor_lang::declare_id;

pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod escrow;
pub mod fees;
pub mod hasher;
pub mod identifier;
pub mod instruction;
pub mod ledger;
pub mod pda;
pub mod state;

pub use client::DirectoryClient;
pub use config::ClientConfig;
pub use errors::{DirectoryError, LedgerError, Result};
pub use hasher::{hash_identifier, IdentifierDigest};
pub use identifier::{normalize, Identifier};
pub use state::{AccountState, RecordType};

declare_id!("Dir8W9GZXU1WU2A3m7oYtYkGDTS5SgsTkSfAaUAoCtMP");
