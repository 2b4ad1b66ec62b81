//! Absolute lock-time finality (BIP113)

use crate::constants::*;
use crate::types::*;

/// Clock an absolute lock time is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTimeKind {
    Height,
    Time,
}

pub fn lock_time_kind(lock_time: u32) -> LockTimeKind {
    if lock_time >= LOCKTIME_THRESHOLD {
        LockTimeKind::Time
    } else {
        LockTimeKind::Height
    }
}

/// Reference value a lock time of `kind` is compared against. After
/// activation, time locks use median-time-past instead of the block's own
/// timestamp; height locks are unaffected.
pub fn lock_time_cutoff(kind: LockTimeKind, snapshot: &ChainSnapshot) -> u32 {
    match kind {
        LockTimeKind::Height => snapshot.height,
        LockTimeKind::Time if snapshot.activation.is_active() => snapshot.median_time_past,
        LockTimeKind::Time => snapshot.block_time,
    }
}

/// IsFinal: ℕ × 𝔹 × 𝒞𝒮 → {true, false}
pub fn is_final(lock_time: u32, inputs_all_max_sequence: bool, snapshot: &ChainSnapshot) -> bool {
    if inputs_all_max_sequence || lock_time == 0 {
        return true;
    }
    lock_time < lock_time_cutoff(lock_time_kind(lock_time), snapshot)
}

/// IsFinalTx: 𝒯𝒳 × 𝒞𝒮 → {true, false}
pub fn is_final_tx(tx: &Transaction, snapshot: &ChainSnapshot) -> bool {
    let all_final = tx.inputs.iter().all(|input| input.sequence == SEQUENCE_FINAL);
    is_final(tx.lock_time, all_final, snapshot)
}
