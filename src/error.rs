/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! error defines sets of error definitions in the entire lifetime of an execution.
//!
//! The result type is two-level. [RuntimeError] is the outer level: either an
//! unrecoverable system fault (storage I/O, never attributable to the executed
//! bytecode) or a deterministic execution failure. [ExeFailure] is the inner
//! level: a pure function of bytecode, inputs and the world-state snapshot, so
//! identical inputs always produce the identical failure. Any `ExeFailure`
//! aborts the whole call tree; no partial state commit is observable.

use crate::types::ContractId;

/// Deterministic failure attributable to the executed program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExeFailure {
    /// Entry or call method index is out of range for the code object.
    #[error("invalid method index {0}")]
    InvalidMethodIndex(usize),

    /// Supplied argument count does not equal the method's declared arity.
    #[error("invalid method argument length: expected {expected}, got {actual}")]
    InvalidMethodArgLength { expected: usize, actual: usize },

    /// A private method was invoked from outside its contract.
    #[error("external call to a private method")]
    ExternalPrivateMethodCall,

    /// The top-level/main method must not return values.
    #[error("non-empty return for main function")]
    NonEmptyReturnForMainFunction,

    /// A call instruction found fewer operands than the callee's arity.
    #[error("insufficient arguments on the operand stack")]
    InsufficientArgs,

    /// The value stack or the frame stack exceeded its configured bound.
    #[error("stack overflow")]
    StackOverflow,

    /// A pop crossed below the current frame's operand region.
    #[error("stack underflow")]
    StackUnderflow,

    /// The gas meter would go below zero. Fatal and not retryable mid-flight.
    #[error("out of gas")]
    OutOfGas,

    /// Approve or transfer asked for more than the remaining balance.
    #[error("not enough balance")]
    NotEnoughBalance,

    /// The queried token has no entry for the address. Distinct from a zero
    /// amount, which is representable.
    #[error("no token balance for the address")]
    NoTokenBalanceForTheAddress,

    /// A ledger holds tokens but no coin amount, which cannot be represented
    /// as a transaction output.
    #[error("invalid output balances")]
    InvalidOutputBalances,

    /// Checked 256-bit arithmetic overflowed, underflowed or divided by zero.
    #[error("arithmetic error")]
    ArithmeticError,

    /// An operand had a different tag than the instruction requires.
    #[error("invalid value type")]
    InvalidType,

    /// A branch target lies outside the method's instruction sequence.
    #[error("invalid instruction offset")]
    InvalidInstrOffset,

    /// The program counter ran past the end of the method without a `Return`.
    #[error("program counter overflow")]
    PcOverflow,

    #[error("invalid local index {0}")]
    InvalidLocalIndex(usize),

    #[error("invalid field index {0}")]
    InvalidFieldIndex(usize),

    /// World-state field values do not match the contract's declared count.
    #[error("invalid field length")]
    InvalidFieldLength,

    /// The method declares fewer locals than arguments.
    #[error("invalid method")]
    InvalidMethod,

    /// A balance instruction ran in a frame with no spending scope.
    #[error("balance instruction in non-payable frame")]
    NonPayableFrame,

    /// A self-referential transfer ran in a script frame.
    #[error("expected a contract frame")]
    ExpectAContract,

    #[error("non-existent contract {0:?}")]
    NonExistentContract(ContractId),

    /// Signature verification failed; the execution aborts rather than
    /// pushing a result.
    #[error("invalid signature")]
    InvalidSignature,
}

/// Outer failure classification observed by the caller of the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Unrecoverable system-level fault from the world-state collaborator.
    /// The caller must abort validation entirely; it is never attributable
    /// to the executed bytecode.
    #[error("world state error: {0}")]
    StateError(#[from] anyhow::Error),

    /// Deterministic execution failure: the transaction or script is
    /// rejected, no outputs are produced and no storage mutation is visible.
    #[error("execution failure: {0}")]
    Execution(#[from] ExeFailure),
}

pub type ExeResult<T> = Result<T, ExeFailure>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
