/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! runtime defines the public entry points of the virtual machine.
//!
//! A [Runtime] executes one script or contract method against a world-state
//! snapshot and either produces an [ExecutionOutput] or a typed failure. A
//! failed execution produces no outputs and no visible storage mutation; the
//! enclosing transaction is simply rejected.

use std::mem;
use std::rc::Rc;

use crate::bytecode::Script;
use crate::context::{ExecutionContext, TxEnv, VmConfig};
use crate::error::RuntimeResult;
use crate::execution::machine::Machine;
use crate::types::{ContractId, TxOutput, Val};
use crate::world_state::WorldState;

/// The result of a successful execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Values returned by the entry method. Empty for main-call semantics.
    pub returns: Vec<Val>,
    /// Newly generated outputs, one per distinct lockup script, in
    /// first-seen order.
    pub generated_outputs: Vec<TxOutput>,
    pub gas_used: u64,
    /// Staged field values of every contract written during execution, in
    /// contract-id order. These become visible to later executions only.
    pub contract_states: Vec<(ContractId, Vec<Val>)>,
}

/// Runtime defines a virtual machine for deterministic script and contract
/// execution.
pub struct Runtime {
    config: VmConfig,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            config: VmConfig::default(),
        }
    }

    /// Override the machine's resource bounds.
    pub fn with_config(config: VmConfig) -> Self {
        Self { config }
    }

    /// Execute a script's entry method with main-call semantics: the entry
    /// method must be public and must return nothing.
    pub fn execute_script<W: WorldState>(
        &self,
        world_state: &W,
        script: &Script,
        args: Vec<Val>,
        env: TxEnv,
    ) -> RuntimeResult<ExecutionOutput> {
        self.run_script(world_state, script, args, env, true)
    }

    /// Execute a script's entry method, allowing returned values.
    pub fn execute_script_with_outputs<W: WorldState>(
        &self,
        world_state: &W,
        script: &Script,
        args: Vec<Val>,
        env: TxEnv,
    ) -> RuntimeResult<ExecutionOutput> {
        self.run_script(world_state, script, args, env, false)
    }

    /// Execute a public method of a deployed contract with main-call
    /// semantics.
    pub fn execute_contract<W: WorldState>(
        &self,
        world_state: &W,
        contract_id: ContractId,
        method_index: usize,
        args: Vec<Val>,
        env: TxEnv,
    ) -> RuntimeResult<ExecutionOutput> {
        let ctx = ExecutionContext::new(self.config, env, world_state);
        let machine = Machine::new(ctx);
        let (returns, ctx) = machine.execute_contract(contract_id, method_index, args, true)?;
        finish(returns, ctx)
    }

    fn run_script<W: WorldState>(
        &self,
        world_state: &W,
        script: &Script,
        args: Vec<Val>,
        env: TxEnv,
        require_empty_return: bool,
    ) -> RuntimeResult<ExecutionOutput> {
        let ctx = ExecutionContext::new(self.config, env, world_state);
        let machine = Machine::new(ctx);
        let (returns, ctx) =
            machine.execute_script(Rc::new(script.clone()), args, require_empty_return)?;
        finish(returns, ctx)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn finish<W: WorldState>(
    returns: Vec<Val>,
    mut ctx: ExecutionContext<'_, W>,
) -> RuntimeResult<ExecutionOutput> {
    let gas_used = ctx.gas.gas_used();
    let generated_outputs = mem::take(&mut ctx.output_balances).into_outputs()?;
    let contract_states = ctx.modified_contract_states();
    Ok(ExecutionOutput {
        returns,
        generated_outputs,
        gas_used,
        contract_states,
    })
}
