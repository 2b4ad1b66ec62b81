//! Error and reject types for lock-time validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract violations a caller can cause. Rule failures are never errors,
/// they are reported through [`crate::types::Verdict`].
#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("Input context mismatch: {inputs} inputs but {contexts} lock contexts")]
    InputContextMismatch { inputs: usize, contexts: usize },

    #[error("Invalid consensus parameters: {0}")]
    InvalidParams(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Script failures raised while executing OP_CHECKSEQUENCEVERIFY and the
/// stack operations around it. The messages are matched verbatim by
/// acceptance logs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptError {
    #[error("Operation not valid with the current stack size")]
    MissingArgument,

    #[error("Negative locktime")]
    NegativeArgument,

    #[error("Script number overflow")]
    NumberOverflow,

    #[error("Operation not valid with the current stack size")]
    InvalidStackOperation,

    /// Push runs past the end of the script
    #[error("Opcode missing or not understood")]
    BadPush,

    #[error("Push value size limit exceeded")]
    PushSize,

    #[error("Operation limit exceeded")]
    OpCount,

    /// Reserved, undefined, OP_VERIF or OP_VERNOTIF
    #[error("Opcode missing or not understood")]
    BadOpcode,

    #[error("Attempted to use a disabled opcode")]
    DisabledOpcode,

    #[error("Invalid OP_IF construction")]
    UnbalancedConditional,

    #[error("OP_RETURN was encountered")]
    OpReturn,

    #[error("Script is too big")]
    ScriptSize,

    #[error("Stack size limit exceeded")]
    StackSize,
}

/// Stable reject reasons
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("bad-txns-nonfinal")]
    NonFinal,

    #[error("Locktime requirement not satisfied")]
    UnsatisfiedLocktime,

    #[error("{0}")]
    InvalidScript(ScriptError),
}

impl RejectReason {
    /// Short enum code, independent of the detail carried
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::NonFinal => "NonFinal",
            RejectReason::UnsatisfiedLocktime => "UnsatisfiedLocktime",
            RejectReason::InvalidScript(_) => "InvalidScript",
        }
    }
}

impl From<ScriptError> for RejectReason {
    fn from(err: ScriptError) -> Self {
        RejectReason::InvalidScript(err)
    }
}
