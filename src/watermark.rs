//! Cross-cycle aggregation state.
//!
//! Per tracked chain: the last block already scanned for token discovery and
//! the number of qualifying DEX pools known for every discovered token. The
//! worker owns one `WatermarkStore` and hands `&mut` access to each cycle, so
//! there is exactly one writer and no locking.

use crate::types::{address_key, Chain, TokenPoolEntry};
use indexmap::{IndexMap, IndexSet};

/// Discovery progress and pool weights for one chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainWatermark {
    last_scanned_block: i64,
    // Insertion order doubles as the tie order when batching equal weights.
    pool_weight: IndexMap<String, u32>,
}

impl ChainWatermark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixture constructor: arbitrary prior state.
    pub fn with_state<I, S>(last_scanned_block: i64, weights: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        Self {
            last_scanned_block,
            pool_weight: weights
                .into_iter()
                .map(|(a, w)| (address_key(a.as_ref()), w))
                .collect(),
        }
    }

    pub fn last_scanned_block(&self) -> i64 {
        self.last_scanned_block
    }

    /// Moves the watermark forward; never backwards.
    pub fn advance_to(&mut self, block: i64) {
        if block > self.last_scanned_block {
            self.last_scanned_block = block;
        }
    }

    /// Starts tracking `address` at weight 0. Returns `false` if already tracked.
    pub fn track(&mut self, address: &str) -> bool {
        let key = address_key(address);
        if key.is_empty() || self.pool_weight.contains_key(&key) {
            return false;
        }
        self.pool_weight.insert(key, 0);
        true
    }

    pub fn is_tracked(&self, address: &str) -> bool {
        self.pool_weight.contains_key(&address_key(address))
    }

    pub fn weight(&self, address: &str) -> Option<u32> {
        self.pool_weight.get(&address_key(address)).copied()
    }

    pub fn len(&self) -> usize {
        self.pool_weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool_weight.is_empty()
    }

    /// Snapshot of the weight table, in insertion order.
    pub fn entries(&self) -> Vec<TokenPoolEntry> {
        self.pool_weight
            .iter()
            .map(|(address, weight)| TokenPoolEntry::new(address.clone(), *weight))
            .collect()
    }

    /// Overwrites the weight of every tracked address present in `counts`.
    /// Untracked addresses are ignored. Returns how many weights were written.
    pub fn apply_pool_counts(&mut self, counts: &IndexMap<String, u32>) -> usize {
        let mut updated = 0;
        for (address, count) in counts {
            if let Some(weight) = self.pool_weight.get_mut(&address_key(address)) {
                *weight = *count;
                updated += 1;
            }
        }
        updated
    }
}

/// All tracked chains, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct WatermarkStore {
    chains: IndexMap<Chain, ChainWatermark>,
}

impl WatermarkStore {
    pub fn new(chains: &[Chain]) -> Self {
        Self {
            chains: chains.iter().map(|c| (*c, ChainWatermark::new())).collect(),
        }
    }

    pub fn chains(&self) -> Vec<Chain> {
        self.chains.keys().copied().collect()
    }

    pub fn chain(&self, chain: Chain) -> Option<&ChainWatermark> {
        self.chains.get(&chain)
    }

    pub fn chain_mut(&mut self, chain: Chain) -> &mut ChainWatermark {
        self.chains.entry(chain).or_default()
    }

    pub fn insert(&mut self, chain: Chain, watermark: ChainWatermark) {
        self.chains.insert(chain, watermark);
    }

    /// Every tracked token once, in chain order then insertion order.
    pub fn token_entries(&self) -> Vec<TokenPoolEntry> {
        let mut seen = IndexSet::new();
        let mut entries = Vec::new();
        for watermark in self.chains.values() {
            for entry in watermark.entries() {
                if seen.insert(entry.address.clone()) {
                    entries.push(entry);
                }
            }
        }
        entries
    }

    pub fn apply_pool_counts(&mut self, counts: &IndexMap<String, u32>) -> usize {
        self.chains
            .values_mut()
            .map(|w| w.apply_pool_counts(counts))
            .sum()
    }

    pub fn tracked_count(&self) -> usize {
        self.chains.values().map(ChainWatermark::len).sum()
    }
}
