/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The read-only world-state collaborator the machine executes against.
//!
//! An execution reads from an already-materialized snapshot: synchronous
//! lookups, no I/O visible to the instruction loop. The trait does not define
//! the collaborator's storage format. Errors from the snapshot are
//! system-level faults and surface through the outer
//! [RuntimeError::StateError](crate::error::RuntimeError); they are never
//! attributable to the executed bytecode.

use crate::balances::Balances;
use crate::bytecode::ContractObject;
use crate::types::ContractId;

pub trait WorldState {
    /// The approved input balances the transaction carries, keyed by lockup
    /// script. This seeds the entry frame's remaining ledger.
    fn get_initial_balances(&self) -> anyhow::Result<Balances>;

    /// Bytecode and current field values for a contract, or `None` if no such
    /// contract exists in the snapshot.
    fn get_contract(&self, id: &ContractId) -> anyhow::Result<Option<ContractObject>>;
}
