//! Relative lock-time (BIP68)
//!
//! An input with an enabled sequence lock may only be spent once its spent
//! output has aged by the encoded number of blocks or 512-second units.

use tracing::trace;

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::sequence::{effective_lock, SequenceLock};
use crate::types::*;

/// Aggregated lock of a whole transaction: the earliest height and
/// median-time-past at which every input is mature. `None` means no input
/// constrains that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequenceLocks {
    pub min_height: Option<u64>,
    pub min_time: Option<u64>,
}

/// RequiredHeight / RequiredTime: 𝒮ℒ × ℐ𝒞 → ℕ
///
/// Earliest height (height-based) or MTP (time-based) at which the input
/// unlocks. `None` for disabled locks.
pub fn required(lock: SequenceLock, ctx: &InputLockContext) -> Option<u64> {
    if lock.disabled {
        return None;
    }
    if lock.time_based {
        Some(ctx.median_time_past as u64 + lock.span())
    } else {
        Some(ctx.height as u64 + lock.span())
    }
}

/// Matured: 𝒮ℒ × ℐ𝒞 × 𝒞𝒮 → {true, false}
pub fn matured(lock: SequenceLock, ctx: &InputLockContext, snapshot: &ChainSnapshot) -> bool {
    match required(lock, ctx) {
        None => true,
        Some(min_time) if lock.time_based => snapshot.median_time_past as u64 >= min_time,
        Some(min_height) => snapshot.height as u64 >= min_height,
    }
}

/// CalculateSequenceLocks: 𝒯𝒳 × ℐ𝒞* → 𝒮ℒ𝒮
///
/// Transactions below version 2 carry no relative locks.
pub fn calculate_sequence_locks(
    tx: &Transaction,
    ctxs: &[InputLockContext],
) -> Result<SequenceLocks> {
    check_context_count(tx, ctxs)?;

    let mut locks = SequenceLocks::default();
    if tx.version < BIP68_MIN_TX_VERSION {
        return Ok(locks);
    }

    for (input, ctx) in tx.inputs.iter().zip(ctxs) {
        let lock = effective_lock(input.sequence, tx.version);
        let Some(min) = required(lock, ctx) else {
            continue;
        };
        let slot = if lock.time_based { &mut locks.min_time } else { &mut locks.min_height };
        *slot = Some(slot.map_or(min, |current| current.max(min)));
    }

    Ok(locks)
}

/// EvaluateSequenceLocks: 𝒮ℒ𝒮 × 𝒞𝒮 → {true, false}
pub fn evaluate_sequence_locks(locks: &SequenceLocks, snapshot: &ChainSnapshot) -> bool {
    let height_ok = locks.min_height.map_or(true, |h| snapshot.height as u64 >= h);
    let time_ok = locks.min_time.map_or(true, |t| snapshot.median_time_past as u64 >= t);
    height_ok && time_ok
}

/// TxIsBIP68Final: 𝒯𝒳 × ℐ𝒞* × 𝒞𝒮 → {true, false}
///
/// `ctxs[i]` describes the output spent by `tx.inputs[i]`; fewer contexts
/// than inputs is a caller error.
pub fn tx_is_bip68_final(
    tx: &Transaction,
    ctxs: &[InputLockContext],
    snapshot: &ChainSnapshot,
) -> Result<bool> {
    let locks = calculate_sequence_locks(tx, ctxs)?;
    let is_final = evaluate_sequence_locks(&locks, snapshot);
    trace!(
        min_height = ?locks.min_height,
        min_time = ?locks.min_time,
        height = snapshot.height,
        median_time_past = snapshot.median_time_past,
        is_final,
        "evaluated sequence locks"
    );
    Ok(is_final)
}

/// Fewer contexts than inputs is a caller error
pub fn check_context_count(tx: &Transaction, ctxs: &[InputLockContext]) -> Result<()> {
    if ctxs.len() < tx.inputs.len() {
        return Err(ConsensusError::InputContextMismatch {
            inputs: tx.inputs.len(),
            contexts: ctxs.len(),
        });
    }
    Ok(())
}
