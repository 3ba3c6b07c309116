//! Pair Registry - Probe Universe from the Token Catalog
//!
//! Every unified token contributes all ordered pairs between its
//! eligible cross-chain variants. Deprecated variants are dropped first;
//! a group left with fewer than two variants contributes nothing, and
//! non-grouped tokens are never probed.

use std::collections::HashSet;

use super::token::{CatalogEntry, OrderedPair, PairKey, TokenRef};

/// Snapshot of the ordered pairs eligible for probing.
#[derive(Debug, Clone, Default)]
pub struct PairRegistry {
    pairs: Vec<OrderedPair>,
}

impl PairRegistry {
    /// Derive the pair universe from a token catalog.
    pub fn from_catalog(catalog: &[CatalogEntry]) -> Self {
        let mut pairs = Vec::new();
        let mut seen = HashSet::new();

        for entry in catalog {
            let CatalogEntry::Unified { grouped, .. } = entry else {
                continue;
            };

            let eligible: Vec<&TokenRef> = grouped
                .iter()
                .filter(|t| !t.deprecated)
                .map(|t| &t.token)
                .collect();
            if eligible.len() < 2 {
                continue;
            }

            for token_in in &eligible {
                for token_out in &eligible {
                    let Some(pair) = OrderedPair::new((*token_in).clone(), (*token_out).clone())
                    else {
                        continue;
                    };
                    if seen.insert(pair.key()) {
                        pairs.push(pair);
                    }
                }
            }
        }

        Self { pairs }
    }

    /// Pairs in catalog order; sweeps launch probes in this order.
    pub fn pairs(&self) -> &[OrderedPair] {
        &self.pairs
    }

    pub fn keys(&self) -> HashSet<PairKey> {
        self.pairs.iter().map(OrderedPair::key).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
