/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The closed instruction set of the virtual machine.
//!
//! Every variant declares a gas cost (see [crate::gas::instr_gas_cost]) and a
//! stack effect applied by the execution engine. The enum serializes through
//! borsh as a self-delimiting tag plus payload, and sequences of instructions
//! are length-prefixed, so `deserialize(serialize(x)) == x` holds for every
//! variant.
//!
//! Operand conventions, where an instruction consumes stack values:
//! amounts are `U256`, addresses are `Address`, token ids travel as 32-byte
//! `ByteVec`s. Operands are listed in push order; the engine pops them in
//! reverse.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::LockupScript;
use crate::u256::U256;

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Instr {
    // Constants and stack manipulation
    ConstTrue,
    ConstFalse,
    U256Const(U256),
    BytesConst(Vec<u8>),
    AddressConst(LockupScript),
    Pop,
    Dup,
    Swap,

    // Locals of the current frame
    LoadLocal(u8),
    StoreLocal(u8),

    // Fields of the current contract
    LoadField(u8),
    StoreField(u8),

    // Checked 256-bit arithmetic; overflow, underflow and division by zero
    // abort with ArithmeticError
    U256Add,
    U256Sub,
    U256Mul,
    U256Div,
    U256Mod,

    // Comparison
    U256Lt,
    U256Le,
    U256Gt,
    U256Ge,
    Eq,
    Neq,

    // Boolean
    BoolNot,
    BoolAnd,
    BoolOr,

    // Byte vectors
    BytesSize,
    BytesConcat,

    // Control flow; offsets are relative to the next instruction
    Jump(i16),
    IfTrue(i16),
    IfFalse(i16),
    Return,

    // Calls. CallLocal targets a method of the current code object;
    // CallExternal pops the target contract id (32-byte ByteVec) and targets
    // one of its public methods.
    CallLocal(u8),
    CallExternal(u8),

    // Balance instructions; operate on the current frame's spending scope
    /// `(address)`: pushes the remaining coin amount, zero when the entry is
    /// absent
    AlphRemaining,
    /// `(address, tokenId)`: pushes the remaining token amount; an absent
    /// token entry fails with NoTokenBalanceForTheAddress
    TokenRemaining,
    /// `(address, amount)`: move coin from remaining to the scope's approved
    ApproveAlph,
    /// `(address, tokenId, amount)`
    ApproveToken,
    /// `(from, to, amount)`: debit remaining, credit the output ledger
    TransferAlph,
    /// `(to, amount)`, from the current contract
    TransferAlphFromSelf,
    /// `(from, amount)`, to the current contract
    TransferAlphToSelf,
    /// `(from, to, tokenId, amount)`
    TransferToken,
    /// `(to, tokenId, amount)`
    TransferTokenFromSelf,
    /// `(from, tokenId, amount)`
    TransferTokenToSelf,

    // Cryptographic primitives
    Blake2b256,
    Sha256,
    Keccak256,
    Ripemd160,
    /// `(message, publicKey, signature)`; aborts with InvalidSignature
    /// instead of pushing a result
    VerifyEd25519,

    // Execution-context primitives
    BlockTimestamp,
    TxGasAmount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractId, Hash256};

    #[test]
    fn every_variant_roundtrips_through_borsh() {
        let variants = vec![
            Instr::ConstTrue,
            Instr::ConstFalse,
            Instr::U256Const(U256::from(123456789)),
            Instr::BytesConst(vec![1, 2, 3]),
            Instr::AddressConst(LockupScript::P2c(ContractId(Hash256([9; 32])))),
            Instr::Pop,
            Instr::Dup,
            Instr::Swap,
            Instr::LoadLocal(3),
            Instr::StoreLocal(3),
            Instr::LoadField(0),
            Instr::StoreField(1),
            Instr::U256Add,
            Instr::U256Sub,
            Instr::U256Mul,
            Instr::U256Div,
            Instr::U256Mod,
            Instr::U256Lt,
            Instr::U256Le,
            Instr::U256Gt,
            Instr::U256Ge,
            Instr::Eq,
            Instr::Neq,
            Instr::BoolNot,
            Instr::BoolAnd,
            Instr::BoolOr,
            Instr::BytesSize,
            Instr::BytesConcat,
            Instr::Jump(-4),
            Instr::IfTrue(2),
            Instr::IfFalse(-1),
            Instr::Return,
            Instr::CallLocal(1),
            Instr::CallExternal(0),
            Instr::AlphRemaining,
            Instr::TokenRemaining,
            Instr::ApproveAlph,
            Instr::ApproveToken,
            Instr::TransferAlph,
            Instr::TransferAlphFromSelf,
            Instr::TransferAlphToSelf,
            Instr::TransferToken,
            Instr::TransferTokenFromSelf,
            Instr::TransferTokenToSelf,
            Instr::Blake2b256,
            Instr::Sha256,
            Instr::Keccak256,
            Instr::Ripemd160,
            Instr::VerifyEd25519,
            Instr::BlockTimestamp,
            Instr::TxGasAmount,
        ];
        for instr in variants {
            let bytes = borsh::to_vec(&instr).unwrap();
            let decoded: Instr = borsh::from_slice(&bytes).unwrap();
            assert_eq!(decoded, instr);
        }
    }

    #[test]
    fn instruction_sequences_are_length_prefixed() {
        let instrs = vec![Instr::ConstTrue, Instr::Pop, Instr::Return];
        let bytes = borsh::to_vec(&instrs).unwrap();
        // u32 length prefix then one tag byte per payload-less instruction
        assert_eq!(bytes.len(), 4 + 3);
        let decoded: Vec<Instr> = borsh::from_slice(&bytes).unwrap();
        assert_eq!(decoded, instrs);
    }
}
