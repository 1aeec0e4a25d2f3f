//! # Batch Planner
//!
//! Packs token addresses into DEX requests bounded by token count and by the
//! summed pool weight, lightest tokens first.

use crate::types::TokenPoolEntry;
use log::debug;

/// One provider request worth of token addresses.
pub type Batch = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_tokens: usize,
    pub max_weight: u32,
}

impl BatchLimits {
    pub fn new(max_tokens: usize, max_weight: u32) -> Self {
        Self {
            max_tokens: max_tokens.max(1),
            max_weight,
        }
    }
}

/// Plans batches for `tokens`.
///
/// Tokens are stably sorted by ascending weight, so equal weights keep their
/// input order. A token joins the open batch only if the batch stays within
/// both limits; otherwise the batch is closed and the token opens the next
/// one. A token heavier than `max_weight` on its own still gets a batch.
pub fn plan_batches(mut tokens: Vec<TokenPoolEntry>, limits: BatchLimits) -> Vec<Batch> {
    tokens.sort_by_key(|t| t.weight);

    let mut batches = Vec::new();
    let mut current: Batch = Vec::new();
    let mut current_weight: u64 = 0;

    for token in tokens {
        let fits = current.len() < limits.max_tokens
            && current_weight + u64::from(token.weight) <= u64::from(limits.max_weight);
        if !fits && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_weight = 0;
        }
        current_weight += u64::from(token.weight);
        current.push(token.address);
    }
    if !current.is_empty() {
        batches.push(current);
    }

    debug!(
        "Planned {} batches (max {} tokens / {} pools each)",
        batches.len(),
        limits.max_tokens,
        limits.max_weight
    );
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn entries(rows: &[(&str, u32)]) -> Vec<TokenPoolEntry> {
        rows.iter().map(|(a, w)| TokenPoolEntry::new(*a, *w)).collect()
    }

    #[test]
    fn test_sort_is_stable_ascending() {
        let batches = plan_batches(entries(&[("A", 3), ("B", 1), ("C", 1)]), BatchLimits::new(1, 30));
        assert_eq!(batches, vec![vec!["B"], vec!["C"], vec!["A"]]);
    }

    #[test]
    fn test_respects_token_count() {
        let tokens: Vec<_> = (0..13).map(|i| TokenPoolEntry::new(format!("0x{i}"), 0)).collect();
        let batches = plan_batches(tokens, BatchLimits::new(6, 30));

        assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![6, 6, 1]);
    }

    #[test]
    fn test_respects_cumulative_weight() {
        let batches = plan_batches(
            entries(&[("a", 10), ("b", 10), ("c", 10), ("d", 10)]),
            BatchLimits::new(6, 30),
        );
        assert_eq!(batches, vec![vec!["a", "b", "c"], vec!["d"]]);
    }

    #[test]
    fn test_overweight_token_gets_singleton_batch() {
        let batches = plan_batches(
            entries(&[("small", 1), ("huge", 100), ("small2", 2)]),
            BatchLimits::new(6, 30),
        );
        assert_eq!(batches, vec![vec!["small", "small2"], vec!["huge"]]);
    }

    #[test]
    fn test_empty_input_plans_nothing() {
        assert!(plan_batches(Vec::new(), BatchLimits::new(6, 30)).is_empty());
    }

    #[test]
    fn test_every_token_placed_exactly_once() {
        let limits = BatchLimits::new(6, 30);
        // deterministic pseudo-random weights, some above the weight cap
        let tokens: Vec<_> = (0..200u32)
            .map(|i| TokenPoolEntry::new(format!("0x{i:04x}"), (i * 37 + 11) % 45))
            .collect();

        let batches = plan_batches(tokens.clone(), limits);

        let placed: Vec<&String> = batches.iter().flatten().collect();
        assert_eq!(placed.len(), tokens.len());
        assert!(placed.iter().all_unique());
        for batch in &batches {
            assert!(!batch.is_empty());
            assert!(batch.len() <= limits.max_tokens);
            let weight: u32 = batch
                .iter()
                .map(|a| tokens.iter().find(|t| &t.address == a).unwrap().weight)
                .sum();
            assert!(weight <= limits.max_weight || batch.len() == 1);
        }
    }
}
