// ============================================================================
// Identifier Constants
// ============================================================================

/// Maximum length of a normalized identifier (bytes of its UTF-8 form)
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Digest size produced by the identifier hasher
pub const DIGEST_LENGTH: usize = 32;

/// Phone numbers follow E.164: at most 15 digits after the `+`
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 15;

/// Maximum length of a handle, not counting the leading `@`
pub const MAX_HANDLE_LENGTH: usize = 64;

// ============================================================================
// Account Versioning
// ============================================================================

/// Layout version written by the current program release
pub const CURRENT_VERSION_MAJOR: u8 = 1;

/// Oldest name record layout still treated as a valid assignment
pub const MIN_VERSION_MAJOR: u8 = 1;

// ============================================================================
// Account Layout Sizes (must match the on-chain program)
// ============================================================================

/// Name record header:
/// - version_major: 1 byte
/// - record_type: 1 byte
/// - state: 2 bytes (u16)
/// - reserved: 28 bytes
/// - signatory: 32 bytes
/// - owner: 32 bytes
///
/// Everything past the header is routing data.
pub const NAME_RECORD_HEADER_SIZE: usize = 1 + 1 + 2 + 28 + 32 + 32; // 96 bytes

/// Largest routing payload an update may address (10 KiB realloc limit)
pub const MAX_ROUTING_DATA_SIZE: usize = 10_240;

/// Reserved padding between the state flags and the signatory
pub const NAME_RECORD_RESERVED: usize = 28;

/// version_major(1) + next_index(4) + name_account(32)
pub const ESCROW_ROOT_SIZE: usize = 1 + 4 + 32; // 37 bytes

/// Root fields + index(4) + prev_index(4) + sender(32) + mint(32)
pub const ESCROW_NODE_SIZE: usize = ESCROW_ROOT_SIZE + 4 + 4 + 32 + 32; // 109 bytes

/// version_major(1) + authority(32) + five u64 fees
pub const FEE_SCHEDULE_SIZE: usize = 1 + 32 + 5 * 8; // 73 bytes

/// version_major(1) + record_type(1) + sender(32) + recipient(32) +
/// transaction_id(32) + mint(32) + amount(8)
pub const NOTIFICATION_REQUEST_SIZE: usize = 1 + 1 + 32 + 32 + 32 + 32 + 8; // 138 bytes

// ============================================================================
// Escrow Chain
// ============================================================================

/// Index of the sentinel root of every escrow chain
pub const ESCROW_ROOT_INDEX: u32 = 0;

/// First index a real escrow node can occupy
pub const FIRST_ESCROW_INDEX: u32 = 1;

/// `next_index` value marking the end of a chain
pub const TERMINAL_INDEX: u32 = u32::MAX;

/// Default cap on node fetches during a single chain walk
pub const DEFAULT_MAX_CHAIN_WALK: u32 = 4096;

// ============================================================================
// Default Fee Schedule (lamports)
// ============================================================================

/// Used when the Config account has not been created yet.
pub mod default_fees {
    pub const VERIFY: u64 = 5_000_000;
    pub const ASSIGN: u64 = 1_000_000;
    pub const TRANSFER: u64 = 0;
    pub const ESCROW: u64 = 100_000;
    pub const NOTIFICATION: u64 = 200_000;
}
