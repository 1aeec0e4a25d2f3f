use crate::utils::create_block_chunks;

/// Inclusive block range to scan for new token addresses in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub from_block: i64,
    pub to_block: i64,
}

impl ScanWindow {
    /// Computes the window for this cycle.
    ///
    /// The start is `max(last_scanned, current - max_block_range) + 1`, so after
    /// downtime only the trailing `max_block_range` blocks are scanned. Returns
    /// `None` when the store has nothing past the watermark.
    pub fn compute(last_scanned: i64, current_block: i64, max_block_range: i64) -> Option<Self> {
        let floor = current_block.saturating_sub(max_block_range.max(1));
        let from_block = last_scanned.max(floor).saturating_add(1);
        if from_block > current_block {
            return None;
        }
        Some(Self {
            from_block,
            to_block: current_block,
        })
    }

    pub fn blocks(&self) -> i64 {
        self.to_block - self.from_block + 1
    }

    /// Ascending sub-ranges of at most `chunk_blocks` blocks.
    pub fn chunks(&self, chunk_blocks: i64) -> Vec<(i64, i64)> {
        create_block_chunks(self.from_block, self.to_block, chunk_blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_clamped_after_downtime() {
        let max_range = 216_000;
        let current = max_range * 10;
        let window = ScanWindow::compute(0, current, max_range).unwrap();
        assert_eq!(window.from_block, current - max_range + 1);
        assert_eq!(window.to_block, current);
        assert_eq!(window.blocks(), max_range);
    }

    #[test]
    fn test_window_resumes_after_watermark() {
        let window = ScanWindow::compute(1_000, 1_050, 216_000).unwrap();
        assert_eq!(window.from_block, 1_001);
        assert_eq!(window.to_block, 1_050);
    }

    #[test]
    fn test_no_window_when_caught_up() {
        assert!(ScanWindow::compute(1_050, 1_050, 100).is_none());
        // store behind the watermark (e.g. table truncated)
        assert!(ScanWindow::compute(1_050, 900, 100).is_none());
    }

    #[test]
    fn test_window_chunks() {
        let window = ScanWindow::compute(0, 10, 100).unwrap();
        assert_eq!(window.chunks(4), vec![(1, 4), (5, 8), (9, 10)]);
    }
}
