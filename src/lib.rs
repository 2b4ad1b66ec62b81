//! # CSV-Consensus
//!
//! Direct implementation of the CSV soft-fork lock-time rules: BIP68 relative
//! lock time, BIP112 `OP_CHECKSEQUENCEVERIFY` and BIP113 median-time-past.
//!
//! This crate provides pure, side-effect-free functions. Every evaluation takes
//! a transaction and an immutable [`ChainSnapshot`] and returns a [`Verdict`];
//! nothing is cached between calls, so independent transactions may be
//! validated concurrently.
//!
//! ## Architecture
//!
//! Data flows strictly downward:
//! - `validation` (orchestrator: absolute, then relative, then opcode checks)
//! - `locktime` (BIP113), `relative_locktime` (BIP68), `script` (BIP112)
//! - `sequence` (sequence field codec), `activation` (height-gated rule set)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: All functions are deterministic and side-effect-free
//! 2. **Verdicts, not errors**: Rule failures are values; `Err` only signals caller contract violations
//! 3. **Explicit activation**: The activation height is configuration, never compiled in
//! 4. **Single decode point**: Sequence bits are interpreted in one place
//!
//! ## Usage
//!
//! ```rust
//! use csv_consensus::*;
//!
//! let consensus = CsvConsensus::new(ConsensusParams::new(432));
//! let tx = Transaction {
//!     version: 2,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint { hash: [1; 32], index: 0 },
//!         script_sig: None,
//!         sequence: 10,
//!     }],
//!     lock_time: 0,
//! };
//! let ctxs = [InputLockContext { height: 500, median_time_past: 0 }];
//!
//! let early = consensus.snapshot(509, 0, 0);
//! let verdict = consensus.validate_transaction(&tx, &ctxs, &early).unwrap();
//! assert_eq!(verdict, Verdict::Rejected(RejectReason::NonFinal));
//!
//! let mature = consensus.snapshot(510, 0, 0);
//! assert!(consensus.validate_transaction(&tx, &ctxs, &mature).unwrap().is_accepted());
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod activation;
pub mod chain;
pub mod sequence;
pub mod relative_locktime;
pub mod locktime;
pub mod script;
pub mod transaction;
pub mod validation;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use activation::{ActivationState, ConsensusParams, Network};
pub use error::{ConsensusError, RejectReason, Result, ScriptError};
pub use sequence::SequenceLock;

/// Main lock-time consensus implementation, bound to one set of parameters
///
/// # Examples
///
/// ```
/// use csv_consensus::{CsvConsensus, Network};
///
/// let consensus = CsvConsensus::for_network(Network::Regtest);
/// assert!(!consensus.activation_state(431).is_active());
/// assert!(consensus.activation_state(432).is_active());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CsvConsensus {
    params: ConsensusParams,
}

impl CsvConsensus {
    /// Create an instance with explicit parameters
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_consensus::{ConsensusParams, CsvConsensus};
    ///
    /// let consensus = CsvConsensus::new(ConsensusParams::new(100));
    /// assert_eq!(consensus.params().csv_activation_height, 100);
    /// ```
    pub fn new(params: ConsensusParams) -> Self {
        Self { params }
    }

    /// Create an instance with a network's deployment height
    pub fn for_network(network: Network) -> Self {
        Self::new(ConsensusParams::for_network(network))
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Rule set in force at `height`
    pub fn activation_state(&self, height: Height) -> ActivationState {
        self.params.activation_state(height)
    }

    /// Snapshot of the block at `height`
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_consensus::{ActivationState, CsvConsensus, Network};
    ///
    /// let consensus = CsvConsensus::for_network(Network::Regtest);
    /// let snapshot = consensus.snapshot(432, 1_600_000_000, 1_600_000_600);
    /// assert_eq!(snapshot.activation, ActivationState::Active);
    /// ```
    pub fn snapshot(&self, height: Height, median_time_past: Timestamp, block_time: Timestamp) -> ChainSnapshot {
        ChainSnapshot::new(height, median_time_past, block_time, &self.params)
    }

    /// Decode a raw sequence field
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_consensus::CsvConsensus;
    /// use csv_consensus::constants::*;
    ///
    /// let consensus = CsvConsensus::default();
    /// let lock = consensus.decode_sequence(SEQUENCE_LOCKTIME_DISABLE_FLAG | (1 << 25) | 10);
    /// assert!(lock.disabled);
    /// assert_eq!(lock.value, 10);
    /// ```
    pub fn decode_sequence(&self, raw: u32) -> SequenceLock {
        sequence::decode(raw)
    }

    pub fn encode_sequence(&self, lock: SequenceLock) -> u32 {
        sequence::encode(lock)
    }

    /// Whether one input's relative lock has matured at `snapshot`
    pub fn sequence_lock_matured(
        &self,
        lock: SequenceLock,
        ctx: &InputLockContext,
        snapshot: &ChainSnapshot,
    ) -> bool {
        relative_locktime::matured(lock, ctx, snapshot)
    }

    /// BIP68 finality of a whole transaction
    pub fn tx_is_bip68_final(
        &self,
        tx: &Transaction,
        ctxs: &[InputLockContext],
        snapshot: &ChainSnapshot,
    ) -> Result<bool> {
        relative_locktime::tx_is_bip68_final(tx, ctxs, snapshot)
    }

    /// Absolute lock-time finality
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_consensus::{CsvConsensus, Network};
    ///
    /// let consensus = CsvConsensus::for_network(Network::Regtest);
    /// let snapshot = consensus.snapshot(500, 1_600_000_000, 1_600_000_600);
    /// assert!(consensus.is_final(0xfffffffe, true, &snapshot));
    /// assert!(!consensus.is_final(1_600_000_000, false, &snapshot));
    /// ```
    pub fn is_final(&self, lock_time: u32, inputs_all_max_sequence: bool, snapshot: &ChainSnapshot) -> bool {
        locktime::is_final(lock_time, inputs_all_max_sequence, snapshot)
    }

    /// Evaluate OP_CHECKSEQUENCEVERIFY against the committing input
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_consensus::*;
    ///
    /// let consensus = CsvConsensus::default();
    /// let verdict = consensus.check_sequence_verify(Some(&[0x0a][..]), 9, 2, ActivationState::Active);
    /// assert_eq!(verdict, Verdict::Rejected(RejectReason::UnsatisfiedLocktime));
    /// ```
    pub fn check_sequence_verify(
        &self,
        argument: Option<&[u8]>,
        sequence: u32,
        tx_version: u32,
        activation: ActivationState,
    ) -> Verdict {
        script::check_sequence_verify(argument, sequence, tx_version, activation)
    }

    /// Validate a transaction's lock-time rules
    pub fn validate_transaction(
        &self,
        tx: &Transaction,
        ctxs: &[InputLockContext],
        snapshot: &ChainSnapshot,
    ) -> Result<Verdict> {
        validation::validate(tx, ctxs, snapshot)
    }

    /// Validate every transaction of a block against one snapshot
    pub fn validate_block(
        &self,
        block: &Block,
        ctxs: &[Vec<InputLockContext>],
        snapshot: &ChainSnapshot,
    ) -> Result<BlockVerdict> {
        validation::validate_block(block, ctxs, snapshot)
    }
}

impl Default for CsvConsensus {
    fn default() -> Self {
        Self::new(ConsensusParams::default())
    }
}
