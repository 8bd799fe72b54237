//! Coin configuration. Everything here is fixed at build time; the
//! `testnet` feature selects the testnet address prefix.

/// Only supported message version.
pub const COIN_SUPPORTED_TX_VERSION: i64 = 0;

/// Highest actor method number accepted for review.
pub const MAX_SUPPORT_METHOD: u64 = 50;

/// Base units per FIL, as a power of ten (attoFIL).
pub const COIN_AMOUNT_DECIMAL_PLACES: usize = 18;

/// Network prefix of textual addresses.
#[cfg(not(feature = "testnet"))]
pub const COIN_NETWORK_PREFIX: u8 = b'f';
#[cfg(feature = "testnet")]
pub const COIN_NETWORK_PREFIX: u8 = b't';
