/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines the bytecode containers the virtual machine executes: [Method],
//! the stateless [Script] and the stateful [Contract], plus the
//! [ContractObject] loaded from world state. All of them round-trip through
//! the borsh codec.

pub mod instr;
pub use instr::Instr;

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{ExeFailure, ExeResult};
use crate::types::{ContractId, Val};

/// The bytecode unit: visibility, payability, arities and an ordered
/// instruction sequence. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Method {
    /// Whether the method may be invoked from outside its code object.
    pub is_public: bool,
    /// Whether invoking the method opens a spending scope; only payable
    /// frames may run balance instructions.
    pub is_payable: bool,
    pub args_len: u8,
    pub locals_len: u8,
    pub return_len: u8,
    pub instrs: Vec<Instr>,
}

impl Method {
    /// A method whose locals cannot hold its own arguments is malformed.
    pub(crate) fn check(&self) -> ExeResult<()> {
        if self.locals_len < self.args_len {
            return Err(ExeFailure::InvalidMethod);
        }
        Ok(())
    }
}

/// A stateless script: methods only, no persisted fields. The entry method is
/// method 0.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Script {
    pub methods: Vec<Method>,
}

impl Script {
    pub fn method(&self, index: usize) -> ExeResult<&Method> {
        self.methods
            .get(index)
            .ok_or(ExeFailure::InvalidMethodIndex(index))
    }
}

/// A stateful contract: a persisted field count plus methods. Initial field
/// values are pulled from world state as part of a [ContractObject].
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Contract {
    pub field_len: u8,
    pub methods: Vec<Method>,
}

impl Contract {
    pub fn method(&self, index: usize) -> ExeResult<&Method> {
        self.methods
            .get(index)
            .ok_or(ExeFailure::InvalidMethodIndex(index))
    }
}

/// A contract materialized from the world-state snapshot: its bytecode and
/// the current field values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractObject {
    pub contract_id: ContractId,
    pub code: Contract,
    pub fields: Vec<Val>,
}

impl ContractObject {
    pub fn new(contract_id: ContractId, code: Contract, fields: Vec<Val>) -> ExeResult<Self> {
        if fields.len() != code.field_len as usize {
            return Err(ExeFailure::InvalidFieldLength);
        }
        Ok(Self {
            contract_id,
            code,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash256;
    use crate::u256::U256;

    #[test]
    fn multi_method_contract_roundtrips() {
        let contract = Contract {
            field_len: 2,
            methods: vec![
                Method {
                    is_public: true,
                    is_payable: false,
                    args_len: 1,
                    locals_len: 2,
                    return_len: 0,
                    instrs: vec![
                        Instr::LoadLocal(0),
                        Instr::U256Const(U256::from(1)),
                        Instr::U256Add,
                        Instr::StoreField(0),
                        Instr::Return,
                    ],
                },
                Method {
                    is_public: false,
                    is_payable: true,
                    args_len: 0,
                    locals_len: 0,
                    return_len: 1,
                    instrs: vec![Instr::LoadField(1), Instr::Return],
                },
            ],
        };
        let bytes = borsh::to_vec(&contract).unwrap();
        assert_eq!(borsh::from_slice::<Contract>(&bytes).unwrap(), contract);
    }

    #[test]
    fn method_index_out_of_range() {
        let script = Script {
            methods: vec![Method {
                is_public: true,
                is_payable: false,
                args_len: 0,
                locals_len: 0,
                return_len: 0,
                instrs: vec![Instr::Return],
            }],
        };
        assert!(script.method(0).is_ok());
        assert_eq!(script.method(3), Err(ExeFailure::InvalidMethodIndex(3)));
    }

    #[test]
    fn field_count_must_match_declaration() {
        let code = Contract {
            field_len: 1,
            methods: vec![],
        };
        let id = ContractId(Hash256([1; 32]));
        assert!(ContractObject::new(id, code.clone(), vec![]).is_err());
        assert!(ContractObject::new(id, code, vec![Val::Bool(true)]).is_ok());
    }
}
