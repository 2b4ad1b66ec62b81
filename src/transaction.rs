//! Transaction serialization and identity

use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};

use crate::types::*;

/// Serialize: 𝒯𝒳 → 𝕊
///
/// Little-endian version, compact-size input count, per input the prevout,
/// compact-size script length and script bytes (empty when absent), and the
/// sequence, then lock time.
pub fn serialize_transaction(tx: &Transaction) -> ByteString {
    let mut out = Vec::with_capacity(10 + tx.inputs.len() * 41);
    out.extend_from_slice(&tx.version.to_le_bytes());
    write_compact_size(&mut out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        out.extend_from_slice(&input.prevout.hash);
        out.extend_from_slice(&input.prevout.index.to_le_bytes());
        let script = input.script_sig.as_deref().unwrap_or_default();
        write_compact_size(&mut out, script.len() as u64);
        out.extend_from_slice(script);
        out.extend_from_slice(&input.sequence.to_le_bytes());
    }
    out.extend_from_slice(&tx.lock_time.to_le_bytes());
    out
}

/// TxId: 𝒯𝒳 → ℍ, SHA256d of the serialization
pub fn calculate_tx_id(tx: &Transaction) -> Hash {
    let mut hasher = sha256d::Hash::engine();
    hasher.input(&serialize_transaction(tx));
    sha256d::Hash::from_engine(hasher).into_inner()
}

/// Transaction id in the conventional byte-reversed hex form, for logs
pub fn display_tx_id(tx: &Transaction) -> String {
    sha256d::Hash::from_inner(calculate_tx_id(tx)).to_string()
}

/// Check if transaction is coinbase
pub fn is_coinbase(tx: &Transaction) -> bool {
    tx.inputs.len() == 1
        && tx.inputs[0].prevout.hash == [0u8; 32]
        && tx.inputs[0].prevout.index == 0xffffffff
}

fn write_compact_size(out: &mut ByteString, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x10000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}
