//! Core types for lock-time validation

use serde::{Deserialize, Serialize};

use crate::activation::ActivationState;
use crate::error::RejectReason;

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Block height
pub type Height = u32;

/// Timestamp in seconds since the epoch
pub type Timestamp = u32;

/// OutPoint: 𝒪 = ℍ × ℕ
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Transaction Input: ℐ = 𝒪 × 𝕊? × ℕ₃₂
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: Option<ByteString>,
    pub sequence: u32,
}

/// Transaction: 𝒯𝒳 = ℕ × ℐ* × ℕ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub lock_time: u32,
}

/// Block: the transactions of one candidate block, judged against a single snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub transactions: Vec<Transaction>,
}

/// Where the output spent by an input was confirmed, as reported by the chain index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLockContext {
    pub height: Height,
    pub median_time_past: Timestamp,
}

/// Chain state a transaction is judged against
///
/// For relative locks this describes the prospective next block; for absolute
/// lock time and the opcode it is the block containing the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub height: Height,
    pub median_time_past: Timestamp,
    /// Timestamp of the containing block itself, used by pre-BIP113 rules
    pub block_time: Timestamp,
    pub activation: ActivationState,
}

/// Validation verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(reason) => Some(*reason),
        }
    }
}

impl From<RejectReason> for Verdict {
    fn from(reason: RejectReason) -> Self {
        Verdict::Rejected(reason)
    }
}

/// Block verdict: the first rejected transaction decides the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockVerdict {
    Accepted,
    Rejected { tx_index: usize, reason: RejectReason },
}
