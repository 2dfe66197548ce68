/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Exact-precision unsigned 256-bit integer with checked arithmetic.
//!
//! Every arithmetic operation detects overflow and underflow and returns `None`
//! instead of wrapping or panicking. Asset amounts and on-stack numeric values
//! are represented with this type, so a silent wrap here would be a
//! fund-creating bug.

use borsh::io::{Error, ErrorKind, Read, Result as IoResult, Write};
use borsh::{BorshDeserialize, BorshSerialize};

type Inner = ruint::Uint<256, 4>;

/// Unsigned 256-bit integer. Serializes to its 32-byte big-endian form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U256(Inner);

impl U256 {
    pub const ZERO: U256 = U256(Inner::ZERO);
    pub const ONE: U256 = U256(Inner::from_limbs([1, 0, 0, 0]));
    pub const MAX: U256 = U256(Inner::MAX);

    pub fn is_zero(&self) -> bool {
        self.0 == Inner::ZERO
    }

    pub fn checked_add(self, rhs: U256) -> Option<U256> {
        self.0.checked_add(rhs.0).map(U256)
    }

    pub fn checked_sub(self, rhs: U256) -> Option<U256> {
        self.0.checked_sub(rhs.0).map(U256)
    }

    pub fn checked_mul(self, rhs: U256) -> Option<U256> {
        self.0.checked_mul(rhs.0).map(U256)
    }

    /// Division by zero is `None`, there is no trapping division.
    pub fn checked_div(self, rhs: U256) -> Option<U256> {
        (!rhs.is_zero()).then(|| U256(self.0 / rhs.0))
    }

    pub fn checked_rem(self, rhs: U256) -> Option<U256> {
        (!rhs.is_zero()).then(|| U256(self.0 % rhs.0))
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        U256(Inner::from_be_bytes(bytes))
    }

    /// Narrowing conversion used by instructions that need machine-sized
    /// quantities (e.g. loop counters in tests). `None` if the value does not
    /// fit in 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256(Inner::from(value))
    }
}

impl BorshSerialize for U256 {
    fn serialize<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_all(&self.to_be_bytes())
    }
}

impl BorshDeserialize for U256 {
    fn deserialize_reader<R: Read>(reader: &mut R) -> IoResult<Self> {
        let mut buf = [0u8; 32];
        reader.read_exact(&mut buf).map_err(|_| {
            Error::new(ErrorKind::InvalidData, "U256 requires 32 bytes")
        })?;
        Ok(U256::from_be_bytes(buf))
    }
}
