//! Consensus constants for BIP68, BIP112 and BIP113

/// Lock time threshold: lock times below this are block heights, at or above are timestamps
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Sequence number for final inputs (opts out of absolute lock time)
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Sequence number signalling RBF while keeping lock time enabled
pub const SEQUENCE_RBF: u32 = 0xfffffffe;

/// BIP68: bit 31 disables the relative lock for this input
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// BIP68: bit 22 selects 512-second units instead of blocks
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

/// BIP68: bits 0-15 hold the relative lock value
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000ffff;

/// BIP68: time-based values are shifted by this many bits (512 seconds per unit)
pub const SEQUENCE_LOCKTIME_GRANULARITY: u32 = 9;

/// Minimum transaction version for which BIP68/BIP112 apply
pub const BIP68_MIN_TX_VERSION: u32 = 2;

/// Number of blocks in the median-time-past window
pub const MEDIAN_TIME_SPAN: usize = 11;

/// Maximum byte length of the OP_CHECKSEQUENCEVERIFY argument (BIP112 allows 5-byte numbers)
pub const MAX_SEQUENCE_SCRIPT_NUM_SIZE: usize = 5;

/// Maximum script length accepted by the sequence executor
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum stack size during script execution
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum size of a single pushed element
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Maximum number of non-push opcodes per script
pub const MAX_OPS_PER_SCRIPT: usize = 201;

// ============================================================================
// CSV DEPLOYMENT HEIGHTS
// ============================================================================

/// CSV (BIP68/112/113) activation on mainnet
pub const CSV_ACTIVATION_MAINNET: u32 = 419_328;

/// CSV activation on testnet
pub const CSV_ACTIVATION_TESTNET: u32 = 770_112;

/// CSV activation on regtest
pub const CSV_ACTIVATION_REGTEST: u32 = 432;

// ============================================================================
// OPCODES
// ============================================================================

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_NOP: u8 = 0x61;
pub const OP_VER: u8 = 0x62;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DROP: u8 = 0x75;
pub const OP_CAT: u8 = 0x7e;
pub const OP_RESERVED1: u8 = 0x89;
pub const OP_RESERVED2: u8 = 0x8a;
pub const OP_NOP10: u8 = 0xb9;

/// OP_CHECKSEQUENCEVERIFY (BIP112), formerly OP_NOP3
pub const OP_CHECKSEQUENCEVERIFY: u8 = 0xb2;

/// Opcodes that fail a script wherever they appear, executed or not
/// (OP_CAT..OP_RIGHT, OP_INVERT..OP_XOR, OP_2MUL, OP_2DIV, OP_MUL..OP_RSHIFT)
pub const DISABLED_OPCODES: [u8; 15] = [
    0x7e, 0x7f, 0x80, 0x81, 0x83, 0x84, 0x85, 0x86, 0x8d, 0x8e, 0x95, 0x96, 0x97, 0x98, 0x99,
];
