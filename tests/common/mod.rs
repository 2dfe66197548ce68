#![allow(dead_code)]

use std::collections::HashMap;

use alph_vm_runtime::balances::Balances;
use alph_vm_runtime::error::RuntimeResult;
use alph_vm_runtime::{
    Contract, ContractId, ContractObject, ExeFailure, ExecutionOutput, Hash256, Instr,
    LockupScript, Method, RuntimeError, Script, TokenId, TxEnv, U256, Val, WorldState,
};

/// Assert that an execution failed with the expected deterministic failure.
pub fn expect_failure(result: RuntimeResult<ExecutionOutput>, expected: ExeFailure) {
    match result {
        Err(RuntimeError::Execution(failure)) => assert_eq!(failure, expected),
        Err(RuntimeError::StateError(e)) => panic!("unexpected state error: {e}"),
        Ok(_) => panic!("expected failure {expected:?}, execution succeeded"),
    }
}

/// In-memory world-state snapshot for tests: the transaction's input
/// balances plus the deployed contracts.
#[derive(Default)]
pub struct SimulateWorldState {
    balances: Balances,
    contracts: HashMap<ContractId, ContractObject>,
}

impl SimulateWorldState {
    pub fn set_alph_balance(&mut self, lockup: LockupScript, amount: u64) {
        self.balances
            .add_alph(lockup, U256::from(amount), 0)
            .unwrap();
    }

    pub fn set_token_balance(&mut self, lockup: LockupScript, token: TokenId, amount: u64) {
        self.balances
            .add_token(lockup, token, U256::from(amount), 0)
            .unwrap();
    }

    pub fn add_contract(&mut self, id: ContractId, code: Contract, fields: Vec<Val>) {
        let object = ContractObject::new(id, code, fields).unwrap();
        self.contracts.insert(id, object);
    }
}

impl WorldState for SimulateWorldState {
    fn get_initial_balances(&self) -> anyhow::Result<Balances> {
        Ok(self.balances.clone())
    }

    fn get_contract(&self, id: &ContractId) -> anyhow::Result<Option<ContractObject>> {
        Ok(self.contracts.get(id).cloned())
    }
}

/// Builder for test methods; public, non-payable and zero arity unless
/// overridden.
pub struct MethodBuilder {
    method: Method,
}

impl MethodBuilder {
    pub fn new() -> Self {
        Self {
            method: Method {
                is_public: true,
                is_payable: false,
                args_len: 0,
                locals_len: 0,
                return_len: 0,
                instrs: Vec::new(),
            },
        }
    }

    pub fn private(mut self) -> Self {
        self.method.is_public = false;
        self
    }

    pub fn payable(mut self) -> Self {
        self.method.is_payable = true;
        self
    }

    pub fn args(mut self, n: u8) -> Self {
        self.method.args_len = n;
        if self.method.locals_len < n {
            self.method.locals_len = n;
        }
        self
    }

    pub fn locals(mut self, n: u8) -> Self {
        self.method.locals_len = n;
        self
    }

    pub fn returns(mut self, n: u8) -> Self {
        self.method.return_len = n;
        self
    }

    pub fn instrs(mut self, instrs: Vec<Instr>) -> Self {
        self.method.instrs = instrs;
        self
    }

    pub fn build(self) -> Method {
        self.method
    }
}

pub fn script(methods: Vec<Method>) -> Script {
    Script { methods }
}

pub fn lockup(n: u8) -> LockupScript {
    LockupScript::P2pkh(Hash256([n; 32]))
}

pub fn token(n: u8) -> TokenId {
    TokenId(Hash256([n; 32]))
}

pub fn contract_id(n: u8) -> ContractId {
    ContractId(Hash256([n; 32]))
}

pub fn token_bytes(token: TokenId) -> Vec<u8> {
    token.0 .0.to_vec()
}

pub fn contract_id_bytes(id: ContractId) -> Vec<u8> {
    id.0 .0.to_vec()
}

pub fn u256(n: u64) -> U256 {
    U256::from(n)
}

pub fn env(gas_limit: u64) -> TxEnv {
    TxEnv {
        gas_limit,
        block_timestamp: 1_690_000_000_000,
    }
}
