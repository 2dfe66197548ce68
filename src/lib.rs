/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! alph-vm-runtime is a deterministic, gas-metered bytecode interpreter that
//! executes stateless scripts and stateful contracts while maintaining a
//! strict asset-accounting ledger (native coin plus token types) across
//! nested calls.
//!
//! ```text
//! f(WS, ENV, CODE, ARGS) -> (OUT | E)
//!
//! WS   = Read-only world-state snapshot
//! ENV  = Transaction and block environment (gas budget included)
//! CODE = Script or contract bytecode plus an entry method
//! OUT  = Returned values, generated outputs, staged contract states
//! E    = Typed failure (system fault or deterministic execution failure)
//! ```
//!
//! ### Example
//!
//! ```rust
//! // prepare a world state (ws), a script and an environment, then execute.
//! let output = alph_vm_runtime::Runtime::new()
//!     .execute_script(&ws, &script, vec![], env);
//! ```
//!
//! Execution is a pure function of its inputs: identical bytecode, arguments
//! and snapshot always produce identical results or the identical
//! [error::ExeFailure], which is what makes results consensus-safe. The
//! [balances] ledgers account every coin and token across approve/transfer
//! instructions, and [gas] is the sole progress bound.

pub mod balances;

pub mod bytecode;
pub use bytecode::{Contract, ContractObject, Instr, Method, Script};

pub mod context;
pub use context::{TxEnv, VmConfig};

pub mod error;
pub use error::{ExeFailure, RuntimeError};

mod execution;

pub mod gas;

pub mod runtime;
pub use runtime::{ExecutionOutput, Runtime};

pub mod types;
pub use types::{ContractId, Hash256, LockupScript, TokenId, TxOutput, Val};

pub mod u256;
pub use u256::U256;

pub mod world_state;
pub use world_state::WorldState;
