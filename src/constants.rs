// src/constants.rs
//
// Application-wide constants. Each constant is documented with its purpose and
// usage context.

/// Palette for tag and subject badges.
///
/// A name maps to an entry by the sum of its UTF-16 code units modulo the palette
/// length, so the same name always gets the same color in every client.
///
/// Used in: `domain/counter.rs`
pub const COUNTER_PALETTE: [&str; 8] = [
    "blue", "green", "purple", "orange", "red", "pink", "indigo", "yellow",
];

/// Maximum number of values in a match-any tag filter.
///
/// The document backend rejects `array-contains-any` clauses with more values;
/// both backends enforce the same limit so behaviour does not depend on the adapter.
///
/// Used in: `domain/filter.rs`
pub const MAX_ANY_TAGS: usize = 10;

/// Upper bound of notes scanned by a backend-assisted text search.
///
/// Used in: `infrastructure/memory.rs`, `infrastructure/sqlite.rs`
pub const SEARCH_SCAN_LIMIT: usize = 1000;

/// Delay in milliseconds after writing the HTML note page before the temp
/// directory may be dropped.
///
/// Used in: `infrastructure/renderer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 500;

/// Prefix of environment variables overriding the configuration file.
///
/// Used in: `infrastructure/config.rs`
pub const ENV_PREFIX: &str = "STUDYNOTES_";
