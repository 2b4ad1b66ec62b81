//! OP_CHECKSEQUENCEVERIFY (BIP112) and the script subset around it
//!
//! Only the instructions that interact with the opcode are executed: data
//! pushes feed its argument, OP_DROP removes it afterwards and conditionals
//! decide whether it runs at all. Every other opcode belongs to the full
//! interpreter and is stepped over.

use crate::activation::ActivationState;
use crate::constants::*;
use crate::error::{RejectReason, ScriptError};
use crate::sequence::{decode, effective_lock};
use crate::types::*;

/// One decoded script instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Data push, including OP_0, OP_1NEGATE and OP_1..OP_16
    Push(PushValue<'a>),
    /// Any non-push opcode
    Op(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushValue<'a> {
    Bytes(&'a [u8]),
    Small(i8),
}

impl PushValue<'_> {
    pub fn to_bytes(self) -> ByteString {
        match self {
            PushValue::Bytes(bytes) => bytes.to_vec(),
            PushValue::Small(n) => encode_script_num(n as i64),
        }
    }
}

/// Iterator over the instructions of a script. Yields a single
/// [`ScriptError::BadPush`] and then stops if a push runs past the end.
pub struct Instructions<'a> {
    script: &'a [u8],
    pc: usize,
    failed: bool,
}

impl<'a> Instructions<'a> {
    pub fn new(script: &'a [u8]) -> Self {
        Self { script, pc: 0, failed: false }
    }

    fn read_len(&mut self, width: usize) -> Option<usize> {
        let end = self.pc.checked_add(width)?;
        let script: &'a [u8] = self.script;
        let bytes = script.get(self.pc..end)?;
        self.pc = end;
        Some(bytes.iter().rev().fold(0usize, |acc, &b| (acc << 8) | b as usize))
    }

    fn read_push(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.pc.checked_add(len)?;
        let script: &'a [u8] = self.script;
        let data = script.get(self.pc..end)?;
        self.pc = end;
        Some(data)
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.script.len() {
            return None;
        }
        let opcode = self.script[self.pc];
        self.pc += 1;

        let len = match opcode {
            OP_0 => return Some(Ok(Instruction::Push(PushValue::Bytes(&[])))),
            0x01..=0x4b => Some(opcode as usize),
            OP_PUSHDATA1 => self.read_len(1),
            OP_PUSHDATA2 => self.read_len(2),
            OP_PUSHDATA4 => self.read_len(4),
            OP_1NEGATE => return Some(Ok(Instruction::Push(PushValue::Small(-1)))),
            OP_1..=OP_16 => {
                let n = (opcode - OP_1 + 1) as i8;
                return Some(Ok(Instruction::Push(PushValue::Small(n))));
            }
            _ => return Some(Ok(Instruction::Op(opcode))),
        };

        match len.and_then(|len| self.read_push(len)) {
            Some(data) => Some(Ok(Instruction::Push(PushValue::Bytes(data)))),
            None => {
                self.failed = true;
                Some(Err(ScriptError::BadPush))
            }
        }
    }
}

/// Whether OP_CHECKSEQUENCEVERIFY occurs as an instruction (not inside push
/// data). Scanning stops at the first malformed push.
pub fn contains_check_sequence_verify(script: &[u8]) -> bool {
    Instructions::new(script)
        .map_while(|instruction| instruction.ok())
        .any(|instruction| instruction == Instruction::Op(OP_CHECKSEQUENCEVERIFY))
}

/// ScriptNum: 𝕊 → ℤ
///
/// Little-endian sign-magnitude, at most `max_size` bytes. The empty string is 0.
pub fn parse_script_num(bytes: &[u8], max_size: usize) -> Result<i64, ScriptError> {
    if bytes.len() > max_size || bytes.len() > 8 {
        return Err(ScriptError::NumberOverflow);
    }
    let Some((&last, _)) = bytes.split_last() else {
        return Ok(0);
    };

    let mut magnitude: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let b = if i == bytes.len() - 1 { b & 0x7f } else { b };
        magnitude |= (b as u64) << (8 * i);
    }

    // 8-byte magnitudes can reach 2^63, which only fits once negated
    let value = magnitude as i128;
    let value = if last & 0x80 != 0 { -value } else { value };
    i64::try_from(value).map_err(|_| ScriptError::NumberOverflow)
}

/// Minimal script number encoding of `n`
pub fn encode_script_num(n: i64) -> ByteString {
    if n == 0 {
        return vec![];
    }
    let negative = n < 0;
    let mut magnitude = n.unsigned_abs();
    let mut bytes = Vec::new();
    while magnitude > 0 {
        bytes.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }
    // Sign bit lives in the top bit of the last byte
    if bytes.last().is_some_and(|&b| b & 0x80 != 0) {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        if let Some(last) = bytes.last_mut() {
            *last |= 0x80;
        }
    }
    bytes
}

/// CheckSequenceVerify: 𝕊? × ℕ₃₂ × ℕ × 𝒜 → 𝒱
///
/// `argument` is the top stack item (`None` for an empty stack), `sequence`
/// the committing input's own sequence. The stack is never modified.
pub fn check_sequence_verify(
    argument: Option<&[u8]>,
    sequence: u32,
    tx_version: u32,
    activation: ActivationState,
) -> Verdict {
    // Before activation the opcode is OP_NOP3
    if !activation.is_active() {
        return Verdict::Accepted;
    }

    let Some(argument) = argument else {
        return ScriptError::MissingArgument.into_verdict();
    };

    let n = match parse_script_num(argument, MAX_SEQUENCE_SCRIPT_NUM_SIZE) {
        Ok(n) => n,
        Err(e) => return e.into_verdict(),
    };
    if n < 0 {
        return ScriptError::NegativeArgument.into_verdict();
    }

    let arg_lock = decode((n & 0xffff_ffff) as u32);
    if arg_lock.disabled {
        return Verdict::Accepted;
    }

    if tx_version < BIP68_MIN_TX_VERSION {
        return RejectReason::UnsatisfiedLocktime.into();
    }

    let input_lock = effective_lock(sequence, tx_version);
    if input_lock.disabled {
        return RejectReason::UnsatisfiedLocktime.into();
    }

    // Heights and 512-second units are not comparable
    if arg_lock.time_based != input_lock.time_based {
        return RejectReason::UnsatisfiedLocktime.into();
    }

    if arg_lock.value <= input_lock.value {
        Verdict::Accepted
    } else {
        RejectReason::UnsatisfiedLocktime.into()
    }
}

/// EvalSequenceScript: 𝕊 × ℕ₃₂ × ℕ × 𝒜 → 𝒱
///
/// Executes pushes, OP_DROP, OP_IF/OP_NOTIF/OP_ELSE/OP_ENDIF and
/// OP_CHECKSEQUENCEVERIFY. Element size, operation count, disabled opcodes and
/// OP_VERIF/OP_VERNOTIF are checked in every branch; reserved opcodes and
/// OP_RETURN fail only when executed. Remaining opcodes are stepped over and
/// their stack effects are left to the full interpreter.
pub fn eval_sequence_script(
    script: &[u8],
    sequence: u32,
    tx_version: u32,
    activation: ActivationState,
) -> Verdict {
    if script.len() > MAX_SCRIPT_SIZE {
        return ScriptError::ScriptSize.into_verdict();
    }

    let mut stack: Vec<ByteString> = Vec::new();
    // One entry per open conditional: whether its current branch executes
    let mut exec_stack: Vec<bool> = Vec::new();
    let mut op_count = 0usize;

    for instruction in Instructions::new(script) {
        let instruction = match instruction {
            Ok(instruction) => instruction,
            Err(e) => return e.into_verdict(),
        };
        let executing = exec_stack.iter().all(|&branch| branch);

        let opcode = match instruction {
            Instruction::Push(value) => {
                if let PushValue::Bytes(data) = value {
                    if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
                        return ScriptError::PushSize.into_verdict();
                    }
                }
                if executing {
                    stack.push(value.to_bytes());
                    if stack.len() > MAX_STACK_SIZE {
                        return ScriptError::StackSize.into_verdict();
                    }
                }
                continue;
            }
            Instruction::Op(opcode) => opcode,
        };

        if opcode > OP_16 {
            op_count += 1;
            if op_count > MAX_OPS_PER_SCRIPT {
                return ScriptError::OpCount.into_verdict();
            }
        }
        if opcode == OP_VERIF || opcode == OP_VERNOTIF {
            return ScriptError::BadOpcode.into_verdict();
        }
        if DISABLED_OPCODES.contains(&opcode) {
            return ScriptError::DisabledOpcode.into_verdict();
        }

        match opcode {
            // OP_IF / OP_NOTIF - open a branch, consuming the condition if executing
            OP_IF | OP_NOTIF => {
                let mut branch = false;
                if executing {
                    let Some(condition) = stack.pop() else {
                        return ScriptError::UnbalancedConditional.into_verdict();
                    };
                    branch = cast_to_bool(&condition) == (opcode == OP_IF);
                }
                exec_stack.push(branch);
            }

            OP_ELSE => match exec_stack.last_mut() {
                Some(branch) => *branch = !*branch,
                None => return ScriptError::UnbalancedConditional.into_verdict(),
            },

            OP_ENDIF => {
                if exec_stack.pop().is_none() {
                    return ScriptError::UnbalancedConditional.into_verdict();
                }
            }

            _ if !executing => {}

            // OP_DROP - remove top stack item
            OP_DROP => {
                if stack.pop().is_none() {
                    return ScriptError::InvalidStackOperation.into_verdict();
                }
            }

            // OP_CHECKSEQUENCEVERIFY - compare top item against the input's sequence
            OP_CHECKSEQUENCEVERIFY => {
                let argument = stack.last().map(Vec::as_slice);
                let verdict = check_sequence_verify(argument, sequence, tx_version, activation);
                if !verdict.is_accepted() {
                    return verdict;
                }
            }

            OP_RETURN => return ScriptError::OpReturn.into_verdict(),

            OP_RESERVED | OP_VER | OP_RESERVED1 | OP_RESERVED2 => {
                return ScriptError::BadOpcode.into_verdict();
            }
            op if op > OP_NOP10 => return ScriptError::BadOpcode.into_verdict(),

            // OP_NOP and opcodes owned by the full interpreter
            _ => {}
        }
    }

    if !exec_stack.is_empty() {
        return ScriptError::UnbalancedConditional.into_verdict();
    }

    Verdict::Accepted
}

/// Stack truthiness: any non-zero byte, except a lone sign bit in the last byte
fn cast_to_bool(bytes: &[u8]) -> bool {
    match bytes.split_last() {
        Some((&last, rest)) => rest.iter().any(|&b| b != 0) || last & 0x7f != 0,
        None => false,
    }
}

impl ScriptError {
    fn into_verdict(self) -> Verdict {
        Verdict::Rejected(RejectReason::InvalidScript(self))
    }
}
