/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines gas, the measurement unit for execution, as a strictly decreasing
//! counter with a configured starting budget, and the cost schedule mapping
//! every instruction to the cost of executing it.
//!
//! Gas is the sole timeout/progress mechanism of the machine: reaching zero is
//! fatal to the execution, deterministic, and not a candidate for retry with
//! more gas mid-flight.

use crate::bytecode::Instr;
use crate::error::{ExeFailure, ExeResult};

/* ↓↓↓ Flat per-instruction costs ↓↓↓ */

/// Cost of the cheapest instructions (constants, stack shuffling).
pub const GAS_BASE: u64 = 2;
/// Locals and field access.
pub const GAS_LOW: u64 = 3;
/// Arithmetic, comparison and branching.
pub const GAS_MID: u64 = 5;
/// Balance-ledger instructions.
pub const GAS_BALANCE: u64 = 30;
/// Pushing a new call frame.
pub const GAS_CALL: u64 = 20;
/// Loading a contract object from world state on an external call.
pub const GAS_CONTRACT_LOAD: u64 = 800;

/* ↓↓↓ Byte-dependent costs, charged on top of the flat cost ↓↓↓ */

pub const GAS_HASH_PER_BYTE: u64 = 1;
pub const GAS_BYTES_PER_BYTE: u64 = 1;
/// Ed25519 verification is priced per message byte plus a flat setup cost.
pub const GAS_VERIFY_ED25519_BASE: u64 = 1000;
pub const GAS_VERIFY_ED25519_PER_BYTE: u64 = 2;

/// instr_gas_cost maps an instruction to the flat cost of executing it. Byte-
/// dependent instructions (hashes, byte-vector operations, signature
/// verification) additionally charge their per-byte constants at execution
/// time, once operand sizes are known.
pub fn instr_gas_cost(instr: &Instr) -> u64 {
    match instr {
        // Constants and stack manipulation
        Instr::ConstTrue
        | Instr::ConstFalse
        | Instr::U256Const(_)
        | Instr::BytesConst(_)
        | Instr::AddressConst(_)
        | Instr::Pop
        | Instr::Dup
        | Instr::Swap => GAS_BASE,

        // Locals and fields
        Instr::LoadLocal(_) | Instr::StoreLocal(_) | Instr::LoadField(_) | Instr::StoreField(_) => {
            GAS_LOW
        }

        // Arithmetic, comparison, boolean
        Instr::U256Add
        | Instr::U256Sub
        | Instr::U256Mul
        | Instr::U256Div
        | Instr::U256Mod
        | Instr::U256Lt
        | Instr::U256Le
        | Instr::U256Gt
        | Instr::U256Ge
        | Instr::Eq
        | Instr::Neq
        | Instr::BoolNot
        | Instr::BoolAnd
        | Instr::BoolOr => GAS_MID,

        // Byte vectors (plus per-byte cost at execution time)
        Instr::BytesSize | Instr::BytesConcat => GAS_MID,

        // Control flow
        Instr::Jump(_) | Instr::IfTrue(_) | Instr::IfFalse(_) | Instr::Return => GAS_MID,

        // Calls
        Instr::CallLocal(_) => GAS_CALL,
        Instr::CallExternal(_) => GAS_CALL + GAS_CONTRACT_LOAD,

        // Balance instructions
        Instr::AlphRemaining
        | Instr::TokenRemaining
        | Instr::ApproveAlph
        | Instr::ApproveToken
        | Instr::TransferAlph
        | Instr::TransferAlphFromSelf
        | Instr::TransferAlphToSelf
        | Instr::TransferToken
        | Instr::TransferTokenFromSelf
        | Instr::TransferTokenToSelf => GAS_BALANCE,

        // Cryptographic and context primitives
        Instr::Blake2b256 | Instr::Sha256 | Instr::Keccak256 | Instr::Ripemd160 => GAS_MID,
        Instr::VerifyEd25519 => GAS_VERIFY_ED25519_BASE,
        Instr::BlockTimestamp | Instr::TxGasAmount => GAS_BASE,
    }
}

/// GasMeter tracks the remaining budget of one execution. It only ever
/// decreases; a charge that would push it below zero fails with
/// [ExeFailure::OutOfGas] and leaves the meter untouched.
#[derive(Clone, Debug)]
pub struct GasMeter {
    limit: u64,
    remaining: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    pub fn charge(&mut self, amount: u64) -> ExeResult<()> {
        match self.remaining.checked_sub(amount) {
            Some(remaining) => {
                self.remaining = remaining;
                Ok(())
            }
            None => Err(ExeFailure::OutOfGas),
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn gas_used(&self) -> u64 {
        self.limit - self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_is_strictly_decreasing() {
        let mut meter = GasMeter::new(10);
        meter.charge(4).unwrap();
        meter.charge(6).unwrap();
        assert_eq!(meter.remaining(), 0);
        assert_eq!(meter.gas_used(), 10);
        assert_eq!(meter.charge(1), Err(ExeFailure::OutOfGas));
        // failed charge leaves the meter untouched
        assert_eq!(meter.remaining(), 0);
    }

    #[test]
    fn schedule_orders_costs_by_weight() {
        assert!(instr_gas_cost(&Instr::Pop) < instr_gas_cost(&Instr::U256Add));
        assert!(instr_gas_cost(&Instr::U256Add) < instr_gas_cost(&Instr::CallLocal(0)));
        assert!(instr_gas_cost(&Instr::CallLocal(0)) < instr_gas_cost(&Instr::ApproveAlph));
        assert!(instr_gas_cost(&Instr::ApproveAlph) < instr_gas_cost(&Instr::CallExternal(0)));
    }
}
