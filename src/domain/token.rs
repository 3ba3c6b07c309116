//! Token catalog and pair identity types.
//!
//! Defines the tradable asset references loaded from the token catalog,
//! the unified (cross-chain) groupings, and the ordered pair identity
//! used as the persistence key for liquidity state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the two asset identifiers of a [`PairKey`].
///
/// Asset identifiers must never contain this character; the config
/// loader rejects catalogs that do.
pub const PAIR_KEY_SEPARATOR: char = '#';

/// A tradable asset: unique identifier plus decimal precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenRef {
    /// Unique asset identifier (e.g. `nep141:wrap.near`).
    pub asset_id: String,
    /// Number of decimals in the asset's base unit.
    pub decimals: u8,
}

impl TokenRef {
    pub fn new(asset_id: impl Into<String>, decimals: u8) -> Self {
        Self {
            asset_id: asset_id.into(),
            decimals,
        }
    }
}

/// A catalog entry for one token variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogToken {
    #[serde(flatten)]
    pub token: TokenRef,
    /// Deprecated assets are never probed.
    #[serde(default)]
    pub deprecated: bool,
    /// Chain label, informational only.
    #[serde(default)]
    pub chain: Option<String>,
}

impl CatalogToken {
    pub fn new(asset_id: impl Into<String>, decimals: u8) -> Self {
        Self {
            token: TokenRef::new(asset_id, decimals),
            deprecated: false,
            chain: None,
        }
    }

    /// Mark the token as deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// One entry of the token catalog.
///
/// A unified entry groups the variants of one logical asset across
/// chains; only unified entries produce probe pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogEntry {
    /// Same logical asset bridged to several chains.
    Unified {
        unified_asset_id: String,
        #[serde(default)]
        symbol: Option<String>,
        grouped: Vec<CatalogToken>,
    },
    /// A token without cross-chain variants.
    Single(CatalogToken),
}

impl CatalogEntry {
    /// All token variants referenced by this entry.
    pub fn tokens(&self) -> impl Iterator<Item = &CatalogToken> {
        let slice: &[CatalogToken] = match self {
            Self::Unified { grouped, .. } => grouped,
            Self::Single(token) => std::slice::from_ref(token),
        };
        slice.iter()
    }
}

/// Persistence key of an ordered pair: `<in>#<out>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairKey(String);

impl PairKey {
    pub fn new(asset_in: &str, asset_out: &str) -> Self {
        Self(format!("{asset_in}{PAIR_KEY_SEPARATOR}{asset_out}"))
    }

    /// Split back into `(asset_in, asset_out)`.
    ///
    /// Returns `None` if the key was not built by [`PairKey::new`].
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.split_once(PAIR_KEY_SEPARATOR)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered `(in, out)` pair of distinct assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderedPair {
    pub token_in: TokenRef,
    pub token_out: TokenRef,
}

impl OrderedPair {
    /// Build a pair, rejecting same-asset combinations.
    pub fn new(token_in: TokenRef, token_out: TokenRef) -> Option<Self> {
        if token_in.asset_id == token_out.asset_id {
            return None;
        }
        Some(Self {
            token_in,
            token_out,
        })
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.token_in.asset_id, &self.token_out.asset_id)
    }

    /// The coarser of the two precisions.
    pub fn min_decimals(&self) -> u8 {
        self.token_in.decimals.min(self.token_out.decimals)
    }
}

impl fmt::Display for OrderedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.token_in.asset_id, self.token_out.asset_id)
    }
}
