/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines common data structures to be used inside this library, or from outside application:
//! hashes and asset identifiers, lockup scripts, the tagged on-stack value type and generated
//! transaction outputs.

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{ExeFailure, ExeResult};
use crate::u256::U256;

type Blake2b256 = Blake2b<U32>;

/// 32-byte hash value. The domain hash function is Blake2b-256.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize, Default,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn blake2b(data: &[u8]) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(data);
        Hash256(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash256(bytes)
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Identifier of a token type. Ordered by its canonical byte encoding, which
/// fixes the layout of token lists in generated outputs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct TokenId(pub Hash256);

/// Identifier of a deployed contract in world state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct ContractId(pub Hash256);

/// A spending-authorization predicate identifying who may own a set of funds.
///
/// The VM never evaluates the predicate; it is a lookup key compared by
/// structural equality. The derived ordering follows the variant tag and then
/// the payload bytes, which coincides with the canonical serialized encoding.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub enum LockupScript {
    /// Pay to public key hash.
    P2pkh(Hash256),
    /// Pay to script hash.
    P2sh(Hash256),
    /// Pay to contract.
    P2c(ContractId),
}

impl LockupScript {
    pub fn p2c(id: ContractId) -> Self {
        LockupScript::P2c(id)
    }
}

/// The tagged value type. Immutable once constructed; it is the only type that
/// may live on the operand stack or in a locals slot.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Val {
    Bool(bool),
    U256(U256),
    ByteVec(Vec<u8>),
    Address(LockupScript),
}

impl Val {
    pub fn as_bool(&self) -> ExeResult<bool> {
        match self {
            Val::Bool(b) => Ok(*b),
            _ => Err(ExeFailure::InvalidType),
        }
    }

    pub fn as_u256(&self) -> ExeResult<U256> {
        match self {
            Val::U256(v) => Ok(*v),
            _ => Err(ExeFailure::InvalidType),
        }
    }

    pub fn as_byte_vec(&self) -> ExeResult<&[u8]> {
        match self {
            Val::ByteVec(bytes) => Ok(bytes),
            _ => Err(ExeFailure::InvalidType),
        }
    }

    pub fn as_lockup_script(&self) -> ExeResult<LockupScript> {
        match self {
            Val::Address(lockup) => Ok(*lockup),
            _ => Err(ExeFailure::InvalidType),
        }
    }
}

/// A newly generated transaction output: one coin amount under one lockup
/// script, plus the token amounts it carries. Token entries are sorted by
/// token id and never zero, so the serialized layout is stable for hashing.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TxOutput {
    pub lockup_script: LockupScript,
    pub alph_amount: U256,
    pub tokens: Vec<(TokenId, U256)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockup_script_order_matches_encoding_order() {
        let a = LockupScript::P2pkh(Hash256([0xff; 32]));
        let b = LockupScript::P2sh(Hash256([0x00; 32]));
        // tag decides first, regardless of payload bytes
        assert!(a < b);
        let enc_a = borsh::to_vec(&a).unwrap();
        let enc_b = borsh::to_vec(&b).unwrap();
        assert!(enc_a < enc_b);
    }

    #[test]
    fn val_downcasts_are_typed() {
        let v = Val::U256(U256::from(7));
        assert_eq!(v.as_u256().unwrap(), U256::from(7));
        assert_eq!(v.as_bool(), Err(ExeFailure::InvalidType));
    }

    #[test]
    fn blake2b_is_32_bytes_and_deterministic() {
        let h1 = Hash256::blake2b(b"alph");
        let h2 = Hash256::blake2b(b"alph");
        assert_eq!(h1, h2);
        assert_ne!(h1, Hash256::blake2b(b"alph "));
    }
}
