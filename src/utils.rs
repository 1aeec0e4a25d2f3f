// src/utils.rs
// Utility functions for the rate feed

/// Splits the inclusive range `[from_block, to_block]` into consecutive
/// inclusive `(start, end)` chunks of at most `chunk_size` blocks.
pub fn create_block_chunks(from_block: i64, to_block: i64, chunk_size: i64) -> Vec<(i64, i64)> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current_from = from_block;
    while current_from <= to_block {
        let current_to = std::cmp::min(current_from.saturating_add(chunk_size - 1), to_block);
        chunks.push((current_from, current_to));
        current_from = current_to + 1;
    }
    chunks
}

/// Short correlation id for the log lines of one run.
pub fn short_run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
