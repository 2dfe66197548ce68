/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! One method invocation: its locals region on the shared value stack, its
//! program counter and its spending scope, plus the spending-scope ledgers
//! themselves.

use std::rc::Rc;

use crate::balances::Balances;
use crate::bytecode::{Method, Script};
use crate::types::ContractId;

/// Which code object a frame executes in. `CallLocal` resolves method indices
/// against this; field access and self-referential transfers require the
/// `Contract` variant.
#[derive(Clone)]
pub(crate) enum FrameCode {
    Script(Rc<Script>),
    Contract(ContractId),
}

/// A call frame. Locals occupy `[locals_base, operand_base)` of the shared
/// value stack; the operand region grows above `operand_base` and popping
/// below it is a stack-discipline violation.
pub(crate) struct Frame {
    pub method: Method,
    pub pc: usize,
    pub locals_base: usize,
    pub operand_base: usize,
    pub code: FrameCode,
    /// Index of the frame's spending scope, `None` for non-payable frames.
    pub scope: Option<usize>,
    /// Whether this frame opened the scope (and must close it on return).
    pub opened_scope: bool,
}

/// One spending-authorization scope: the funds still available and the funds
/// approved for the next payable call.
pub(crate) struct BalanceScope {
    pub remaining: Balances,
    pub approved: Balances,
    pub depth: usize,
}

impl BalanceScope {
    pub fn new(remaining: Balances, depth: usize) -> Self {
        Self {
            remaining,
            approved: Balances::new(),
            depth,
        }
    }
}
