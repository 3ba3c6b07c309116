//! Persistence Adapters - Liquidity Table Storage
//!
//! Implements the `LiquidityStore` port. Both backends share the same
//! in-memory table logic; the file backend additionally snapshots the
//! table to `liquidity.json` after every mutation using atomic writes.

pub mod file;
pub mod memory;
mod table;

pub use file::FileLiquidityStore;
pub use memory::MemoryLiquidityStore;
