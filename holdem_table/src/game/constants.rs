//! Table-wide constants.

/// Cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Community cards dealt by the river.
pub const BOARD_SIZE: usize = 5;

/// Largest table a single deck can serve: `2 * seats + 5 <= 52`.
pub const MAX_SEATS: usize = (DECK_SIZE - BOARD_SIZE) / 2;

/// Default table size when nothing else is configured.
pub const DEFAULT_MAX_SEATS: usize = 9;

/// Minimum buy-in expressed in big blinds.
pub const MIN_BUY_IN_BIG_BLINDS: i32 = 100;

/// Most chips one table can hold across stacks and pots. Every stack, bet and
/// pot total fits in an `i32` wire field as long as this holds.
pub const MAX_TABLE_CHIPS: i32 = i32::MAX;
