use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::constants::{DEFAULT_MAX_CHAIN_WALK, MIN_VERSION_MAJOR};

/// Client settings. Every field has a default, so a partial (or empty)
/// document deserializes.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Deployed directory program (base58)
    #[serde_as(as = "DisplayFromStr")]
    pub program_id: Pubkey,

    /// Oldest name record layout accepted as a valid assignment
    pub min_version_major: u8,

    /// Cap on node reads during one escrow chain walk
    pub max_chain_walk: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: crate::ID,
            min_version_major: MIN_VERSION_MAJOR,
            max_chain_walk: DEFAULT_MAX_CHAIN_WALK,
        }
    }
}

impl ClientConfig {
    pub fn with_program_id(program_id: Pubkey) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }
}
