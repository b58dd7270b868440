//! Constants used throughout the medsim core crate.

/// Environment variable naming an optional YAML overlay for the reference tables.
pub const REFERENCE_DATA_ENV: &str = "MEDSIM_REFERENCE_DATA";

/// Environment variable overriding the default invite lifetime in days.
pub const INVITE_EXPIRATION_DAYS_ENV: &str = "MEDSIM_INVITE_EXPIRATION_DAYS";

/// Environment variable overriding the asset list page size.
pub const PAGE_SIZE_ENV: &str = "MEDSIM_PAGE_SIZE";

/// Invite lifetime when none is configured.
pub const DEFAULT_INVITE_EXPIRATION_DAYS: u32 = 7;

/// Upper bound accepted for an invite lifetime.
pub const MAX_INVITE_EXPIRATION_DAYS: u32 = 365;

/// Asset list page size when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound accepted for a configured page size.
pub const MAX_PAGE_SIZE: usize = 200;

/// Length of the secret invite token embedded in invite links.
pub const INVITE_TOKEN_LEN: usize = 32;

/// Length of the short human-typed invite code.
pub const INVITE_CODE_LEN: usize = 8;

/// Alphabet for invite codes. Excludes 0/O and 1/I which are easily confused when read aloud.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
