/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines the execution context threaded through the engine.
//!
//! Limits, ambient transaction/block data and the gas meter are all explicit
//! members of the context; nothing is ambient or global. Each execution owns
//! its context exclusively, so no ledger, frame or staged write is ever
//! shared between executions.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::balances::Balances;
use crate::bytecode::{Contract, ContractObject};
use crate::error::{ExeFailure, RuntimeError, RuntimeResult};
use crate::gas::GasMeter;
use crate::types::{ContractId, Val};
use crate::world_state::WorldState;

/// Hard resource bounds of the machine.
#[derive(Clone, Copy, Debug)]
pub struct VmConfig {
    /// Maximum number of slots on the shared value stack (locals plus
    /// operands of all live frames).
    pub op_stack_max_size: usize,
    /// Maximum call-frame depth.
    pub frame_stack_max_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            op_stack_max_size: 1024,
            frame_stack_max_size: 1024,
        }
    }
}

/// Ambient data of the transaction and block under which an execution runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TxEnv {
    /// Gas budget for the whole execution.
    pub gas_limit: u64,
    /// Unix timestamp (milliseconds) of the enclosing block.
    pub block_timestamp: u64,
}

/// A contract's staged in-flight state: bytecode plus field values as last
/// written by `StoreField`. Writes stay here until the execution succeeds;
/// the world-state snapshot itself is never mutated.
#[derive(Clone, Debug)]
pub(crate) struct ContractState {
    pub code: Contract,
    pub fields: Vec<Val>,
    pub modified: bool,
}

/// Everything one execution owns: configuration, environment, gas meter,
/// world-state handle, the loaded-contract cache with staged field writes,
/// and the output ledger accumulated by transfers.
pub(crate) struct ExecutionContext<'a, W: WorldState> {
    pub config: VmConfig,
    pub env: TxEnv,
    pub gas: GasMeter,
    world_state: &'a W,
    contracts: BTreeMap<ContractId, ContractState>,
    pub output_balances: Balances,
}

impl<'a, W: WorldState> ExecutionContext<'a, W> {
    pub fn new(config: VmConfig, env: TxEnv, world_state: &'a W) -> Self {
        Self {
            config,
            env,
            gas: GasMeter::new(env.gas_limit),
            world_state,
            contracts: BTreeMap::new(),
            output_balances: Balances::new(),
        }
    }

    /// The transaction's approved input balances, read from the snapshot.
    pub fn initial_balances(&self) -> RuntimeResult<Balances> {
        self.world_state
            .get_initial_balances()
            .map_err(RuntimeError::StateError)
    }

    /// Look up a contract, loading it from the snapshot on first touch.
    pub fn contract(&mut self, id: ContractId) -> RuntimeResult<&ContractState> {
        Ok(self.ensure_loaded(id)?)
    }

    pub fn contract_mut(&mut self, id: ContractId) -> RuntimeResult<&mut ContractState> {
        self.ensure_loaded(id)
    }

    fn ensure_loaded(&mut self, id: ContractId) -> RuntimeResult<&mut ContractState> {
        match self.contracts.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let obj: ContractObject = self
                    .world_state
                    .get_contract(&id)
                    .map_err(RuntimeError::StateError)?
                    .ok_or(ExeFailure::NonExistentContract(id))?;
                if obj.fields.len() != obj.code.field_len as usize {
                    return Err(ExeFailure::InvalidFieldLength.into());
                }
                Ok(entry.insert(ContractState {
                    code: obj.code,
                    fields: obj.fields,
                    modified: false,
                }))
            }
        }
    }

    /// Staged field values of every contract written during execution, in
    /// contract-id order. Only meaningful after a successful run; on failure
    /// the whole context is discarded.
    pub fn modified_contract_states(self) -> Vec<(ContractId, Vec<Val>)> {
        self.contracts
            .into_iter()
            .filter(|(_, state)| state.modified)
            .map(|(id, state)| (id, state.fields))
            .collect()
    }
}
