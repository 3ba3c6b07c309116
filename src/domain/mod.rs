//! Domain layer - Core probing logic and models.
//!
//! Pure types and the adaptive search rule. No I/O here (hexagonal
//! architecture inner ring); everything is testable in isolation.

pub mod amount;
pub mod liquidity;
pub mod registry;
pub mod search;
pub mod token;

// Re-export core types for convenience
pub use amount::Amount;
pub use liquidity::{CheckStatus, LiquidityState};
pub use registry::PairRegistry;
pub use search::AdaptiveSearch;
pub use token::{
    CatalogEntry, CatalogToken, OrderedPair, PairKey, TokenRef, PAIR_KEY_SEPARATOR,
};
