//! BIP68 sequence field codec
//!
//! The 32-bit input sequence is decoded once into a [`SequenceLock`] and that
//! value is threaded through every evaluator. Only bits 31, 22 and 0-15 carry
//! meaning; everything else is dropped here.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Decoded relative lock: 𝒮ℒ = 𝔹 × 𝔹 × ℕ₁₆
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceLock {
    pub disabled: bool,
    pub time_based: bool,
    pub value: u16,
}

impl SequenceLock {
    /// Height-based lock of `blocks` blocks
    pub fn blocks(blocks: u16) -> Self {
        Self { disabled: false, time_based: false, value: blocks }
    }

    /// Time-based lock of `units` × 512 seconds
    pub fn time_units(units: u16) -> Self {
        Self { disabled: false, time_based: true, value: units }
    }

    /// Time-based lock covering at least `seconds`, rounded up to whole units
    pub fn from_seconds(seconds: u32) -> Self {
        let unit = 1u32 << SEQUENCE_LOCKTIME_GRANULARITY;
        let units = seconds.div_ceil(unit).min(u16::MAX as u32);
        Self::time_units(units as u16)
    }

    /// Relative lock opted out
    pub fn disabled() -> Self {
        Self { disabled: true, time_based: false, value: 0 }
    }

    /// Lock length in seconds for time-based locks, blocks otherwise
    pub fn span(&self) -> u64 {
        if self.time_based {
            (self.value as u64) << SEQUENCE_LOCKTIME_GRANULARITY
        } else {
            self.value as u64
        }
    }
}

/// Decode: ℕ₃₂ → 𝒮ℒ
pub fn decode(raw: u32) -> SequenceLock {
    SequenceLock {
        disabled: raw & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0,
        time_based: raw & SEQUENCE_LOCKTIME_TYPE_FLAG != 0,
        value: (raw & SEQUENCE_LOCKTIME_MASK) as u16,
    }
}

/// Encode: 𝒮ℒ → ℕ₃₂, non-consensus bits are zero
pub fn encode(lock: SequenceLock) -> u32 {
    let mut raw = lock.value as u32;
    if lock.disabled {
        raw |= SEQUENCE_LOCKTIME_DISABLE_FLAG;
    }
    if lock.time_based {
        raw |= SEQUENCE_LOCKTIME_TYPE_FLAG;
    }
    raw
}

/// Effective lock of an input under the transaction's version. Versions below
/// 2 predate BIP68, so every input is treated as disabled.
pub fn effective_lock(sequence: u32, tx_version: u32) -> SequenceLock {
    if tx_version < BIP68_MIN_TX_VERSION {
        return SequenceLock { disabled: true, ..decode(sequence) };
    }
    decode(sequence)
}
