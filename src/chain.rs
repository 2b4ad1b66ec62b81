//! Chain snapshot construction

use crate::activation::ConsensusParams;
use crate::constants::MEDIAN_TIME_SPAN;
use crate::types::*;

/// MedianTimePast: ℕ* → ℕ
///
/// Median of the last [`MEDIAN_TIME_SPAN`] timestamps of `timestamps`, which
/// must be ordered oldest first and end at the block whose MTP is requested.
/// Returns 0 for an empty chain.
pub fn median_time_past(timestamps: &[Timestamp]) -> Timestamp {
    let start = timestamps.len().saturating_sub(MEDIAN_TIME_SPAN);
    let mut window = timestamps[start..].to_vec();
    if window.is_empty() {
        return 0;
    }
    window.sort_unstable();
    window[window.len() / 2]
}

impl ChainSnapshot {
    /// Snapshot of the block at `height`, activation derived from `params`
    pub fn new(
        height: Height,
        median_time_past: Timestamp,
        block_time: Timestamp,
        params: &ConsensusParams,
    ) -> Self {
        Self {
            height,
            median_time_past,
            block_time,
            activation: params.activation_state(height),
        }
    }

    /// Snapshot of the prospective successor of a tip, as used for mempool
    /// acceptance. `tip_median_time_past` is the MTP of the tip, which is the
    /// clock the successor is judged by.
    pub fn for_next_block(
        tip_height: Height,
        tip_median_time_past: Timestamp,
        block_time: Timestamp,
        params: &ConsensusParams,
    ) -> Self {
        Self::new(tip_height.saturating_add(1), tip_median_time_past, block_time, params)
    }

    /// Snapshot for a block built on top of `timestamps` (oldest first, ending at the parent)
    pub fn from_parent_timestamps(
        height: Height,
        timestamps: &[Timestamp],
        block_time: Timestamp,
        params: &ConsensusParams,
    ) -> Self {
        Self::new(height, median_time_past(timestamps), block_time, params)
    }
}
