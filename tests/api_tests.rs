//! Tests for the public CsvConsensus API

use csv_consensus::*;

fn input(sequence: u32, script_sig: Option<ByteString>) -> TransactionInput {
    TransactionInput {
        prevout: OutPoint { hash: [9; 32], index: 0 },
        script_sig,
        sequence,
    }
}

#[test]
fn test_csv_consensus_networks() {
    assert_eq!(CsvConsensus::for_network(Network::Mainnet).params().csv_activation_height, 419_328);
    assert_eq!(CsvConsensus::for_network(Network::Testnet).params().csv_activation_height, 770_112);
    assert_eq!(CsvConsensus::for_network(Network::Regtest).params().csv_activation_height, 432);
    assert_eq!(*CsvConsensus::default().params(), ConsensusParams::default());
}

#[test]
fn test_params_from_json_configs() -> anyhow::Result<()> {
    let explicit = ConsensusParams::from_json(r#"{"csv_activation_height": 0}"#)?;
    assert!(explicit.activation_state(0).is_active());

    let preset = ConsensusParams::from_json(r#"{"network": "testnet"}"#)?;
    assert_eq!(preset, ConsensusParams::for_network(Network::Testnet));

    let consensus = CsvConsensus::new(preset);
    assert!(!consensus.activation_state(770_111).is_active());
    assert!(consensus.activation_state(770_112).is_active());
    Ok(())
}

#[test]
fn test_params_from_json_rejects_garbage() {
    for json in ["", "{}", "[]", r#"{"csv_activation_height": -1}"#, r#"{"network": 5}"#] {
        let result = ConsensusParams::from_json(json);
        assert!(matches!(result, Err(ConsensusError::InvalidParams(_))), "{}", json);
    }
}

#[test]
fn test_error_display() {
    let err = ConsensusError::InputContextMismatch { inputs: 3, contexts: 1 };
    assert_eq!(err.to_string(), "Input context mismatch: 3 inputs but 1 lock contexts");
}

#[test]
fn test_reject_messages() {
    assert_eq!(RejectReason::NonFinal.to_string(), "bad-txns-nonfinal");
    assert_eq!(RejectReason::UnsatisfiedLocktime.to_string(), "Locktime requirement not satisfied");
    assert_eq!(
        RejectReason::from(ScriptError::NegativeArgument).to_string(),
        "Negative locktime"
    );
    assert_eq!(
        RejectReason::from(ScriptError::MissingArgument).to_string(),
        "Operation not valid with the current stack size"
    );
}

#[test]
fn test_transaction_serde_round_trip() -> anyhow::Result<()> {
    let tx = Transaction {
        version: 2,
        inputs: vec![input(SEQUENCE_LOCKTIME_TYPE_FLAG | 3, Some(vec![0x53, OP_CHECKSEQUENCEVERIFY]))],
        lock_time: 600_000_000,
    };
    let json = serde_json::to_string(&tx)?;
    let back: Transaction = serde_json::from_str(&json)?;
    assert_eq!(back, tx);
    Ok(())
}

#[test]
fn test_verdict_serde() -> anyhow::Result<()> {
    let verdict = Verdict::Rejected(RejectReason::InvalidScript(ScriptError::NegativeArgument));
    let json = serde_json::to_string(&verdict)?;
    assert_eq!(serde_json::from_str::<Verdict>(&json)?, verdict);
    assert_eq!(verdict.reject_reason().map(|r| r.code()), Some("InvalidScript"));
    assert_eq!(Verdict::Accepted.reject_reason(), None);
    Ok(())
}

#[test]
fn test_snapshot_via_chain_helpers() {
    let params = ConsensusParams::new(20);
    let times: Vec<Timestamp> = (0..20).map(|h| 1_000 + h * 10).collect();

    let snapshot = ChainSnapshot::from_parent_timestamps(20, &times, 1_200, &params);
    assert_eq!(snapshot.height, 20);
    // Median of the last eleven: heights 9..=19
    assert_eq!(snapshot.median_time_past, 1_140);
    assert_eq!(snapshot.activation, ActivationState::Active);

    let next = ChainSnapshot::for_next_block(18, 1_130, 1_190, &params);
    assert_eq!(next.height, 19);
    assert_eq!(next.activation, ActivationState::Inactive);
}

#[test]
fn test_sequence_lock_constructors() {
    let consensus = CsvConsensus::default();
    assert_eq!(consensus.encode_sequence(SequenceLock::blocks(144)), 144);
    assert_eq!(
        consensus.encode_sequence(SequenceLock::from_seconds(3_600)),
        SEQUENCE_LOCKTIME_TYPE_FLAG | 8
    );
    assert_eq!(
        consensus.decode_sequence(SEQUENCE_FINAL),
        SequenceLock { disabled: true, time_based: true, value: 0xffff }
    );
}

#[test]
fn test_check_sequence_verify_facade() {
    let consensus = CsvConsensus::for_network(Network::Regtest);
    let arg = [0x0a];

    assert!(consensus.check_sequence_verify(Some(&arg[..]), 10, 2, ActivationState::Active).is_accepted());
    assert!(consensus.check_sequence_verify(Some(&arg[..]), 9, 2, ActivationState::Inactive).is_accepted());
    assert_eq!(
        consensus.check_sequence_verify(None, 10, 2, ActivationState::Active),
        Verdict::Rejected(RejectReason::InvalidScript(ScriptError::MissingArgument))
    );
}

#[test]
fn test_validate_transaction_multiple_inputs() -> anyhow::Result<()> {
    let consensus = CsvConsensus::for_network(Network::Regtest);
    let tx = Transaction {
        version: 2,
        inputs: vec![input(5, None), input(SEQUENCE_LOCKTIME_TYPE_FLAG | 2, None)],
        lock_time: 0,
    };
    let ctxs = [
        InputLockContext { height: 1_000, median_time_past: 5_000 },
        InputLockContext { height: 900, median_time_past: 4_000 },
    ];

    // Height satisfied, time short by one second
    let snapshot = consensus.snapshot(1_005, 5_023, 5_600);
    assert_eq!(
        consensus.validate_transaction(&tx, &ctxs, &snapshot)?,
        Verdict::Rejected(RejectReason::NonFinal)
    );

    let snapshot = consensus.snapshot(1_005, 5_024, 5_600);
    assert_eq!(consensus.validate_transaction(&tx, &ctxs, &snapshot)?, Verdict::Accepted);
    Ok(())
}

#[test]
fn test_is_final_lock_time_height() {
    let consensus = CsvConsensus::for_network(Network::Regtest);
    let snapshot = consensus.snapshot(500, 1_600_000_000, 1_600_000_600);
    assert!(consensus.is_final(499, false, &snapshot));
    assert!(!consensus.is_final(500, false, &snapshot));
    assert!(consensus.is_final(500, true, &snapshot));
}
