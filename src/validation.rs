//! Lock-time validation of transactions and blocks
//!
//! Checks run in a fixed order: absolute lock time, then relative lock time,
//! then OP_CHECKSEQUENCEVERIFY during script execution. The first failure is
//! the verdict.

use tracing::debug;

use crate::constants::BIP68_MIN_TX_VERSION;
use crate::error::{RejectReason, Result};
use crate::locktime::is_final_tx;
use crate::relative_locktime::{check_context_count, tx_is_bip68_final};
use crate::script::{contains_check_sequence_verify, eval_sequence_script};
use crate::transaction::{display_tx_id, is_coinbase};
use crate::types::*;

/// Validate: 𝒯𝒳 × ℐ𝒞* × 𝒞𝒮 → 𝒱
///
/// `ctxs[i]` describes the output spent by `tx.inputs[i]`. Coinbase
/// transactions spend nothing and need no contexts.
pub fn validate(
    tx: &Transaction,
    ctxs: &[InputLockContext],
    snapshot: &ChainSnapshot,
) -> Result<Verdict> {
    // 1. Absolute lock time (BIP113 clock after activation)
    if !is_final_tx(tx, snapshot) {
        return Ok(reject(tx, None, RejectReason::NonFinal));
    }

    if is_coinbase(tx) {
        return Ok(Verdict::Accepted);
    }
    check_context_count(tx, ctxs)?;

    // 2. Relative lock time (BIP68)
    if snapshot.activation.is_active()
        && tx.version >= BIP68_MIN_TX_VERSION
        && !tx_is_bip68_final(tx, ctxs, snapshot)?
    {
        return Ok(reject(tx, None, RejectReason::NonFinal));
    }

    // 3. OP_CHECKSEQUENCEVERIFY (BIP112)
    for (i, input) in tx.inputs.iter().enumerate() {
        let Some(script) = input.script_sig.as_deref() else {
            continue;
        };
        if !contains_check_sequence_verify(script) {
            continue;
        }
        if let Verdict::Rejected(reason) =
            eval_sequence_script(script, input.sequence, tx.version, snapshot.activation)
        {
            return Ok(reject(tx, Some(i), reason));
        }
    }

    Ok(Verdict::Accepted)
}

/// ValidateBlock: ℬ × (ℐ𝒞*)* × 𝒞𝒮 → ℬ𝒱
///
/// `ctxs[i]` holds the input contexts of `block.transactions[i]`.
pub fn validate_block(
    block: &Block,
    ctxs: &[Vec<InputLockContext>],
    snapshot: &ChainSnapshot,
) -> Result<BlockVerdict> {
    for (i, tx) in block.transactions.iter().enumerate() {
        let tx_ctxs = ctxs.get(i).map(Vec::as_slice).unwrap_or_default();
        if let Verdict::Rejected(reason) = validate(tx, tx_ctxs, snapshot)? {
            debug!(tx_index = i, height = snapshot.height, %reason, "block rejected");
            return Ok(BlockVerdict::Rejected { tx_index: i, reason });
        }
    }
    Ok(BlockVerdict::Accepted)
}

fn reject(tx: &Transaction, input: Option<usize>, reason: RejectReason) -> Verdict {
    debug!(txid = %display_tx_id(tx), ?input, code = reason.code(), %reason, "transaction rejected");
    Verdict::Rejected(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationState;
    use crate::constants::*;
    use crate::error::{ConsensusError, ScriptError};
    use crate::script::encode_script_num;

    const CONFIRMED_AT: Height = 1_000;

    fn snapshot(height: Height, activation: ActivationState) -> ChainSnapshot {
        ChainSnapshot { height, median_time_past: 1_600_000_000, block_time: 1_600_000_600, activation }
    }

    fn ctxs() -> Vec<InputLockContext> {
        vec![InputLockContext { height: CONFIRMED_AT, median_time_past: 1_599_990_000 }]
    }

    fn csv_script(argument: i64) -> ByteString {
        let arg = encode_script_num(argument);
        let mut script = vec![arg.len() as u8];
        script.extend_from_slice(&arg);
        script.extend_from_slice(&[OP_CHECKSEQUENCEVERIFY, OP_DROP]);
        script
    }

    fn tx(version: u32, sequence: u32, script_sig: Option<ByteString>) -> Transaction {
        Transaction {
            version,
            inputs: vec![TransactionInput {
                prevout: OutPoint { hash: [3; 32], index: 0 },
                script_sig,
                sequence,
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn test_validate_plain_transaction() {
        let tx = tx(1, SEQUENCE_FINAL, None);
        let verdict = validate(&tx, &ctxs(), &snapshot(2_000, ActivationState::Active)).unwrap();
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[test]
    fn test_validate_relative_lock_boundary() {
        let tx = tx(2, 10, None);
        let early = snapshot(CONFIRMED_AT + 9, ActivationState::Active);
        let mature = snapshot(CONFIRMED_AT + 10, ActivationState::Active);
        assert_eq!(validate(&tx, &ctxs(), &early).unwrap(), Verdict::Rejected(RejectReason::NonFinal));
        assert_eq!(validate(&tx, &ctxs(), &mature).unwrap(), Verdict::Accepted);
    }

    #[test]
    fn test_validate_relative_lock_ignored_before_activation() {
        let tx = tx(2, 10, None);
        let early = snapshot(CONFIRMED_AT + 9, ActivationState::Inactive);
        assert_eq!(validate(&tx, &ctxs(), &early).unwrap(), Verdict::Accepted);
    }

    #[test]
    fn test_validate_absolute_lock_checked_first() {
        // Both the lock time and the relative lock fail; lock time is reported
        let mut tx = tx(2, 10, Some(csv_script(11)));
        tx.lock_time = 5_000;
        let snap = snapshot(CONFIRMED_AT + 1, ActivationState::Active);
        assert_eq!(validate(&tx, &ctxs(), &snap).unwrap(), Verdict::Rejected(RejectReason::NonFinal));
    }

    #[test]
    fn test_validate_relative_lock_before_opcode() {
        let tx = tx(2, 10, Some(csv_script(11)));
        let snap = snapshot(CONFIRMED_AT + 1, ActivationState::Active);
        assert_eq!(validate(&tx, &ctxs(), &snap).unwrap(), Verdict::Rejected(RejectReason::NonFinal));
    }

    #[test]
    fn test_validate_opcode_failure() {
        let tx = tx(2, 9, Some(csv_script(10)));
        let snap = snapshot(CONFIRMED_AT + 100, ActivationState::Active);
        assert_eq!(
            validate(&tx, &ctxs(), &snap).unwrap(),
            Verdict::Rejected(RejectReason::UnsatisfiedLocktime)
        );
    }

    #[test]
    fn test_validate_opcode_failure_ignored_before_activation() {
        let tx = tx(2, 9, Some(csv_script(10)));
        let snap = snapshot(CONFIRMED_AT + 100, ActivationState::Inactive);
        assert_eq!(validate(&tx, &ctxs(), &snap).unwrap(), Verdict::Accepted);
    }

    #[test]
    fn test_validate_script_without_opcode_not_executed() {
        // A bare OP_DROP would fail if executed
        let tx = tx(2, SEQUENCE_FINAL, Some(vec![OP_DROP]));
        let snap = snapshot(2_000, ActivationState::Active);
        assert_eq!(validate(&tx, &ctxs(), &snap).unwrap(), Verdict::Accepted);
    }

    #[test]
    fn test_validate_negative_argument() {
        let tx = tx(2, 10, Some(vec![OP_1NEGATE, OP_CHECKSEQUENCEVERIFY, OP_DROP]));
        let snap = snapshot(2_000, ActivationState::Active);
        assert_eq!(
            validate(&tx, &ctxs(), &snap).unwrap(),
            Verdict::Rejected(RejectReason::InvalidScript(ScriptError::NegativeArgument))
        );
    }

    #[test]
    fn test_validate_context_mismatch() {
        let tx = tx(2, 10, None);
        let result = validate(&tx, &[], &snapshot(2_000, ActivationState::Active));
        assert!(matches!(result, Err(ConsensusError::InputContextMismatch { .. })));
    }

    #[test]
    fn test_validate_context_mismatch_before_activation() {
        let tx = tx(1, 10, None);
        let result = validate(&tx, &[], &snapshot(2_000, ActivationState::Inactive));
        assert!(matches!(
            result,
            Err(ConsensusError::InputContextMismatch { inputs: 1, contexts: 0 })
        ));
    }

    #[test]
    fn test_validate_coinbase() {
        let coinbase = Transaction {
            version: 2,
            inputs: vec![TransactionInput {
                prevout: OutPoint { hash: [0; 32], index: 0xffffffff },
                script_sig: Some(vec![OP_CHECKSEQUENCEVERIFY]),
                sequence: 10,
            }],
            lock_time: 0,
        };
        let verdict = validate(&coinbase, &[], &snapshot(2_000, ActivationState::Active)).unwrap();
        assert_eq!(verdict, Verdict::Accepted);
    }

    #[test]
    fn test_validate_block_reports_first_failure() {
        let block = Block {
            transactions: vec![tx(2, 10, None), tx(2, 9, Some(csv_script(10))), tx(2, 100, None)],
        };
        let all_ctxs = vec![ctxs(), ctxs(), ctxs()];
        let snap = snapshot(CONFIRMED_AT + 20, ActivationState::Active);
        assert_eq!(
            validate_block(&block, &all_ctxs, &snap).unwrap(),
            BlockVerdict::Rejected { tx_index: 1, reason: RejectReason::UnsatisfiedLocktime }
        );
    }

    #[test]
    fn test_validate_block_accepts() {
        let block = Block { transactions: vec![tx(2, 10, Some(csv_script(10))), tx(1, 0, None)] };
        let all_ctxs = vec![ctxs(), ctxs()];
        let snap = snapshot(CONFIRMED_AT + 10, ActivationState::Active);
        assert_eq!(validate_block(&block, &all_ctxs, &snap).unwrap(), BlockVerdict::Accepted);
    }
}
