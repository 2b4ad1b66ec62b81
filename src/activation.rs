//! CSV soft-fork activation
//!
//! Activation is a pure function of height: there are no transition events,
//! the state is recomputed for every snapshot.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ConsensusError, Result};
use crate::types::Height;

/// Which rule set applies at a given height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationState {
    /// Legacy rules: OP_CHECKSEQUENCEVERIFY is OP_NOP3, BIP68 unenforced, lock time uses block time
    Inactive,
    /// BIP68, BIP112 and BIP113 enforced
    Active,
}

impl ActivationState {
    /// ActivationState: ℕ × ℕ → {Inactive, Active}
    pub fn at_height(height: Height, activation_height: Height) -> Self {
        if height >= activation_height {
            ActivationState::Active
        } else {
            ActivationState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ActivationState::Active)
    }
}

/// Network presets for the CSV deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

/// Consensus parameters consumed by the activation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// First height at which CSV rules are enforced
    pub csv_activation_height: Height,
}

impl ConsensusParams {
    pub fn new(csv_activation_height: Height) -> Self {
        Self { csv_activation_height }
    }

    pub fn for_network(network: Network) -> Self {
        let csv_activation_height = match network {
            Network::Mainnet => CSV_ACTIVATION_MAINNET,
            Network::Testnet => CSV_ACTIVATION_TESTNET,
            Network::Regtest => CSV_ACTIVATION_REGTEST,
        };
        Self { csv_activation_height }
    }

    /// Parse parameters from JSON. Accepts either an explicit
    /// `{"csv_activation_height": N}` or a preset `{"network": "regtest"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Source {
            Explicit(ConsensusParams),
            Preset { network: Network },
        }

        match serde_json::from_str::<Source>(json) {
            Ok(Source::Explicit(params)) => Ok(params),
            Ok(Source::Preset { network }) => Ok(Self::for_network(network)),
            Err(e) => Err(ConsensusError::InvalidParams(e.to_string())),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ConsensusError::Serialization(e.to_string()))
    }

    pub fn activation_state(&self, height: Height) -> ActivationState {
        ActivationState::at_height(height, self.csv_activation_height)
    }
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}
