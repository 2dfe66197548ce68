/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The fetch-decode-execute engine.
//!
//! A machine owns a shared value stack, a frame stack and a stack of spending
//! scopes, and executes one entry invocation to completion. Execution is
//! strictly single-threaded and synchronous: the loop never suspends and all
//! world-state reads are lookups against the snapshot held by the context.
//! Any failure unwinds the whole call tree immediately; the caller observes
//! success-with-results or a single terminal failure, never partial state.

use std::mem;
use std::rc::Rc;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use ripemd::Ripemd160;
use sha2::Sha256;
use tiny_keccak::{Hasher as _, Keccak};

use crate::balances::Balances;
use crate::bytecode::{Instr, Method, Script};
use crate::context::ExecutionContext;
use crate::error::{ExeFailure, ExeResult, RuntimeResult};
use crate::execution::frame::{BalanceScope, Frame, FrameCode};
use crate::execution::stack::Stack;
use crate::gas::{
    instr_gas_cost, GAS_BYTES_PER_BYTE, GAS_HASH_PER_BYTE, GAS_VERIFY_ED25519_PER_BYTE,
};
use crate::types::{ContractId, Hash256, LockupScript, TokenId, Val};
use crate::u256::U256;
use crate::world_state::WorldState;

pub(crate) struct Machine<'a, W: WorldState> {
    ctx: ExecutionContext<'a, W>,
    stack: Stack<Val>,
    frames: Stack<Frame>,
    scopes: Vec<BalanceScope>,
}

impl<'a, W: WorldState> Machine<'a, W> {
    pub fn new(ctx: ExecutionContext<'a, W>) -> Self {
        let stack = Stack::new(ctx.config.op_stack_max_size);
        let frames = Stack::new(ctx.config.frame_stack_max_size);
        Self {
            ctx,
            stack,
            frames,
            scopes: Vec::new(),
        }
    }

    /// Execute a stateless script's method 0 to completion.
    pub fn execute_script(
        mut self,
        script: Rc<Script>,
        args: Vec<Val>,
        require_empty_return: bool,
    ) -> RuntimeResult<(Vec<Val>, ExecutionContext<'a, W>)> {
        let method = script.method(0)?.clone();
        self.enter(FrameCode::Script(script), method, args, require_empty_return)?;
        let returns = self.run()?;
        Ok((returns, self.ctx))
    }

    /// Execute a method of a deployed contract to completion.
    pub fn execute_contract(
        mut self,
        contract_id: ContractId,
        method_index: usize,
        args: Vec<Val>,
        require_empty_return: bool,
    ) -> RuntimeResult<(Vec<Val>, ExecutionContext<'a, W>)> {
        let method = self
            .ctx
            .contract(contract_id)?
            .code
            .method(method_index)?
            .clone();
        self.enter(
            FrameCode::Contract(contract_id),
            method,
            args,
            require_empty_return,
        )?;
        let returns = self.run()?;
        Ok((returns, self.ctx))
    }

    /// Entry validation and first frame push.
    fn enter(
        &mut self,
        code: FrameCode,
        method: Method,
        args: Vec<Val>,
        require_empty_return: bool,
    ) -> RuntimeResult<()> {
        method.check()?;
        if !method.is_public {
            return Err(ExeFailure::ExternalPrivateMethodCall.into());
        }
        if args.len() != method.args_len as usize {
            return Err(ExeFailure::InvalidMethodArgLength {
                expected: method.args_len as usize,
                actual: args.len(),
            }
            .into());
        }
        if require_empty_return && method.return_len != 0 {
            return Err(ExeFailure::NonEmptyReturnForMainFunction.into());
        }
        let scope = if method.is_payable {
            let remaining = self.ctx.initial_balances()?;
            self.scopes.push(BalanceScope::new(remaining, 0));
            Some(0)
        } else {
            None
        };
        self.push_frame(code, method, args, scope, scope.is_some())?;
        Ok(())
    }

    /// Reserve the locals region on the shared value stack and push the frame.
    fn push_frame(
        &mut self,
        code: FrameCode,
        method: Method,
        args: Vec<Val>,
        scope: Option<usize>,
        opened_scope: bool,
    ) -> ExeResult<()> {
        method.check()?;
        let locals_base = self.stack.len();
        let locals_len = method.locals_len as usize;
        for arg in args {
            self.stack.push(arg)?;
        }
        for _ in method.args_len..method.locals_len {
            self.stack.push(Val::Bool(false))?;
        }
        let operand_base = locals_base + locals_len;
        self.frames.push(Frame {
            method,
            pc: 0,
            locals_base,
            operand_base,
            code,
            scope,
            opened_scope,
        })
    }

    /// The fetch-decode-execute loop. Charges each instruction's gas before
    /// applying its effect; branching instructions set the program counter
    /// directly.
    fn run(&mut self) -> RuntimeResult<Vec<Val>> {
        loop {
            let (instr, operand_base, scope, code) = {
                let frame = self
                    .frames
                    .top()
                    .expect("frame stack is non-empty inside the run loop");
                match frame.method.instrs.get(frame.pc) {
                    Some(instr) => (
                        instr.clone(),
                        frame.operand_base,
                        frame.scope,
                        frame.code.clone(),
                    ),
                    None => return Err(ExeFailure::PcOverflow.into()),
                }
            };
            // pc now points at the next instruction; branch offsets are
            // relative to it
            self.frames
                .top_mut()
                .expect("frame stack is non-empty inside the run loop")
                .pc += 1;
            self.ctx.gas.charge(instr_gas_cost(&instr))?;
            if let Some(returns) = self.step(instr, operand_base, scope, code)? {
                return Ok(returns);
            }
        }
    }

    /// Apply one instruction. Returns `Some(values)` when the entry frame
    /// returned and execution is complete.
    fn step(
        &mut self,
        instr: Instr,
        operand_base: usize,
        scope: Option<usize>,
        code: FrameCode,
    ) -> RuntimeResult<Option<Vec<Val>>> {
        match instr {
            // Constants and stack manipulation
            Instr::ConstTrue => self.stack.push(Val::Bool(true))?,
            Instr::ConstFalse => self.stack.push(Val::Bool(false))?,
            Instr::U256Const(v) => self.stack.push(Val::U256(v))?,
            Instr::BytesConst(bytes) => self.stack.push(Val::ByteVec(bytes))?,
            Instr::AddressConst(lockup) => self.stack.push(Val::Address(lockup))?,
            Instr::Pop => {
                self.stack.pop_with_floor(operand_base)?;
            }
            Instr::Dup => {
                if self.stack.len() <= operand_base {
                    return Err(ExeFailure::StackUnderflow.into());
                }
                self.stack.dup()?;
            }
            Instr::Swap => self.stack.swap(operand_base)?,

            // Locals
            Instr::LoadLocal(index) => {
                let val = self.local(operand_base, index)?.clone();
                self.stack.push(val)?;
            }
            Instr::StoreLocal(index) => {
                let val = self.stack.pop_with_floor(operand_base)?;
                let slot = self.local_index(operand_base, index)?;
                self.stack.set(slot, val)?;
            }

            // Contract fields
            Instr::LoadField(index) => {
                let id = self.self_contract(&code)?;
                let state = self.ctx.contract(id)?;
                let val = state
                    .fields
                    .get(index as usize)
                    .ok_or(ExeFailure::InvalidFieldIndex(index as usize))?
                    .clone();
                self.stack.push(val)?;
            }
            Instr::StoreField(index) => {
                let id = self.self_contract(&code)?;
                let val = self.stack.pop_with_floor(operand_base)?;
                let state = self.ctx.contract_mut(id)?;
                let slot = state
                    .fields
                    .get_mut(index as usize)
                    .ok_or(ExeFailure::InvalidFieldIndex(index as usize))?;
                *slot = val;
                state.modified = true;
            }

            // Arithmetic
            Instr::U256Add => self.binary_u256(operand_base, U256::checked_add)?,
            Instr::U256Sub => self.binary_u256(operand_base, U256::checked_sub)?,
            Instr::U256Mul => self.binary_u256(operand_base, U256::checked_mul)?,
            Instr::U256Div => self.binary_u256(operand_base, U256::checked_div)?,
            Instr::U256Mod => self.binary_u256(operand_base, U256::checked_rem)?,

            // Comparison
            Instr::U256Lt => self.compare_u256(operand_base, |a, b| a < b)?,
            Instr::U256Le => self.compare_u256(operand_base, |a, b| a <= b)?,
            Instr::U256Gt => self.compare_u256(operand_base, |a, b| a > b)?,
            Instr::U256Ge => self.compare_u256(operand_base, |a, b| a >= b)?,
            Instr::Eq => {
                let b = self.stack.pop_with_floor(operand_base)?;
                let a = self.stack.pop_with_floor(operand_base)?;
                self.stack.push(Val::Bool(a == b))?;
            }
            Instr::Neq => {
                let b = self.stack.pop_with_floor(operand_base)?;
                let a = self.stack.pop_with_floor(operand_base)?;
                self.stack.push(Val::Bool(a != b))?;
            }

            // Boolean
            Instr::BoolNot => {
                let v = self.pop_bool(operand_base)?;
                self.stack.push(Val::Bool(!v))?;
            }
            Instr::BoolAnd => {
                let b = self.pop_bool(operand_base)?;
                let a = self.pop_bool(operand_base)?;
                self.stack.push(Val::Bool(a && b))?;
            }
            Instr::BoolOr => {
                let b = self.pop_bool(operand_base)?;
                let a = self.pop_bool(operand_base)?;
                self.stack.push(Val::Bool(a || b))?;
            }

            // Byte vectors
            Instr::BytesSize => {
                let bytes = self.pop_bytes(operand_base)?;
                self.stack.push(Val::U256(U256::from(bytes.len() as u64)))?;
            }
            Instr::BytesConcat => {
                let b = self.pop_bytes(operand_base)?;
                let mut a = self.pop_bytes(operand_base)?;
                self.ctx
                    .gas
                    .charge(GAS_BYTES_PER_BYTE * (a.len() + b.len()) as u64)?;
                a.extend_from_slice(&b);
                self.stack.push(Val::ByteVec(a))?;
            }

            // Control flow
            Instr::Jump(offset) => self.branch(offset)?,
            Instr::IfTrue(offset) => {
                if self.pop_bool(operand_base)? {
                    self.branch(offset)?;
                }
            }
            Instr::IfFalse(offset) => {
                if !self.pop_bool(operand_base)? {
                    self.branch(offset)?;
                }
            }
            Instr::Return => return self.do_return(operand_base),

            // Calls
            Instr::CallLocal(index) => {
                let callee = match &code {
                    FrameCode::Script(script) => script.method(index as usize)?.clone(),
                    FrameCode::Contract(id) => {
                        self.ctx.contract(*id)?.code.method(index as usize)?.clone()
                    }
                };
                self.call(code, callee, operand_base, scope)?;
            }
            Instr::CallExternal(index) => {
                let target = ContractId(Hash256(self.pop_bytes32(operand_base)?));
                let callee = self
                    .ctx
                    .contract(target)?
                    .code
                    .method(index as usize)?
                    .clone();
                if !callee.is_public {
                    return Err(ExeFailure::ExternalPrivateMethodCall.into());
                }
                self.call(FrameCode::Contract(target), callee, operand_base, scope)?;
            }

            // Balance instructions
            Instr::AlphRemaining => {
                let lockup = self.pop_lockup(operand_base)?;
                let amount = self.scope_ref(scope)?.remaining.alph_amount(&lockup);
                self.stack.push(Val::U256(amount))?;
            }
            Instr::TokenRemaining => {
                let token_id = self.pop_token_id(operand_base)?;
                let lockup = self.pop_lockup(operand_base)?;
                let amount = self
                    .scope_ref(scope)?
                    .remaining
                    .token_amount(&lockup, &token_id)
                    .ok_or(ExeFailure::NoTokenBalanceForTheAddress)?;
                self.stack.push(Val::U256(amount))?;
            }
            Instr::ApproveAlph => {
                let amount = self.pop_u256(operand_base)?;
                let lockup = self.pop_lockup(operand_base)?;
                let scope = self.scope_mut(scope)?;
                let depth = scope.depth;
                scope
                    .remaining
                    .use_alph(&lockup, amount)
                    .ok_or(ExeFailure::NotEnoughBalance)?;
                scope
                    .approved
                    .add_alph(lockup, amount, depth)
                    .ok_or(ExeFailure::ArithmeticError)?;
            }
            Instr::ApproveToken => {
                let amount = self.pop_u256(operand_base)?;
                let token_id = self.pop_token_id(operand_base)?;
                let lockup = self.pop_lockup(operand_base)?;
                let scope = self.scope_mut(scope)?;
                let depth = scope.depth;
                scope
                    .remaining
                    .use_token(&lockup, &token_id, amount)
                    .ok_or(ExeFailure::NotEnoughBalance)?;
                scope
                    .approved
                    .add_token(lockup, token_id, amount, depth)
                    .ok_or(ExeFailure::ArithmeticError)?;
            }
            Instr::TransferAlph => {
                let amount = self.pop_u256(operand_base)?;
                let to = self.pop_lockup(operand_base)?;
                let from = self.pop_lockup(operand_base)?;
                self.transfer_alph(scope, from, to, amount)?;
            }
            Instr::TransferAlphFromSelf => {
                let amount = self.pop_u256(operand_base)?;
                let to = self.pop_lockup(operand_base)?;
                let from = self.self_lockup(&code)?;
                self.transfer_alph(scope, from, to, amount)?;
            }
            Instr::TransferAlphToSelf => {
                let amount = self.pop_u256(operand_base)?;
                let from = self.pop_lockup(operand_base)?;
                let to = self.self_lockup(&code)?;
                self.transfer_alph(scope, from, to, amount)?;
            }
            Instr::TransferToken => {
                let amount = self.pop_u256(operand_base)?;
                let token_id = self.pop_token_id(operand_base)?;
                let to = self.pop_lockup(operand_base)?;
                let from = self.pop_lockup(operand_base)?;
                self.transfer_token(scope, from, to, token_id, amount)?;
            }
            Instr::TransferTokenFromSelf => {
                let amount = self.pop_u256(operand_base)?;
                let token_id = self.pop_token_id(operand_base)?;
                let to = self.pop_lockup(operand_base)?;
                let from = self.self_lockup(&code)?;
                self.transfer_token(scope, from, to, token_id, amount)?;
            }
            Instr::TransferTokenToSelf => {
                let amount = self.pop_u256(operand_base)?;
                let token_id = self.pop_token_id(operand_base)?;
                let from = self.pop_lockup(operand_base)?;
                let to = self.self_lockup(&code)?;
                self.transfer_token(scope, from, to, token_id, amount)?;
            }

            // Cryptographic primitives
            Instr::Blake2b256 => {
                let bytes = self.pop_bytes(operand_base)?;
                self.ctx.gas.charge(GAS_HASH_PER_BYTE * bytes.len() as u64)?;
                type Blake2b256 = Blake2b<U32>;
                let mut hasher = Blake2b256::new();
                hasher.update(&bytes);
                self.stack.push(Val::ByteVec(hasher.finalize().to_vec()))?;
            }
            Instr::Sha256 => {
                let bytes = self.pop_bytes(operand_base)?;
                self.ctx.gas.charge(GAS_HASH_PER_BYTE * bytes.len() as u64)?;
                let mut hasher = Sha256::new();
                sha2::Digest::update(&mut hasher, &bytes);
                self.stack
                    .push(Val::ByteVec(sha2::Digest::finalize(hasher).to_vec()))?;
            }
            Instr::Keccak256 => {
                let bytes = self.pop_bytes(operand_base)?;
                self.ctx.gas.charge(GAS_HASH_PER_BYTE * bytes.len() as u64)?;
                let mut output = [0u8; 32];
                let mut keccak = Keccak::v256();
                keccak.update(&bytes);
                keccak.finalize(&mut output);
                self.stack.push(Val::ByteVec(output.to_vec()))?;
            }
            Instr::Ripemd160 => {
                let bytes = self.pop_bytes(operand_base)?;
                self.ctx.gas.charge(GAS_HASH_PER_BYTE * bytes.len() as u64)?;
                let mut hasher = Ripemd160::new();
                ripemd::Digest::update(&mut hasher, &bytes);
                self.stack
                    .push(Val::ByteVec(ripemd::Digest::finalize(hasher).to_vec()))?;
            }
            Instr::VerifyEd25519 => {
                let signature = self.pop_bytes(operand_base)?;
                let public_key = self.pop_bytes32(operand_base)?;
                let message = self.pop_bytes(operand_base)?;
                self.ctx
                    .gas
                    .charge(GAS_VERIFY_ED25519_PER_BYTE * message.len() as u64)?;
                let key = VerifyingKey::from_bytes(&public_key)
                    .map_err(|_| ExeFailure::InvalidSignature)?;
                let signature = Signature::from_slice(&signature)
                    .map_err(|_| ExeFailure::InvalidSignature)?;
                key.verify(&message, &signature)
                    .map_err(|_| ExeFailure::InvalidSignature)?;
            }

            // Context primitives
            Instr::BlockTimestamp => {
                self.stack
                    .push(Val::U256(U256::from(self.ctx.env.block_timestamp)))?;
            }
            Instr::TxGasAmount => {
                self.stack
                    .push(Val::U256(U256::from(self.ctx.env.gas_limit)))?;
            }
        }
        Ok(None)
    }

    //
    // Frame and scope plumbing
    //

    /// Pop the callee's arguments, open a spending scope for payable callees
    /// and push the new frame.
    fn call(
        &mut self,
        code: FrameCode,
        callee: Method,
        operand_base: usize,
        caller_scope: Option<usize>,
    ) -> RuntimeResult<()> {
        callee.check()?;
        let argc = callee.args_len as usize;
        if self.stack.len() - operand_base < argc {
            return Err(ExeFailure::InsufficientArgs.into());
        }
        let mut args = Vec::with_capacity(argc);
        for _ in 0..argc {
            args.push(self.stack.pop_with_floor(operand_base)?);
        }
        args.reverse();

        let (scope, opened_scope) = if callee.is_payable {
            // only the explicitly approved ledger crosses the call boundary
            let approved = caller_scope
                .map(|index| mem::take(&mut self.scopes[index].approved))
                .unwrap_or_default();
            let depth = self.scopes.len();
            let mut remaining = Balances::new();
            remaining
                .merge(approved, depth)
                .ok_or(ExeFailure::ArithmeticError)?;
            self.scopes.push(BalanceScope::new(remaining, depth));
            (Some(self.scopes.len() - 1), true)
        } else {
            (None, false)
        };

        self.push_frame(code, callee, args, scope, opened_scope)?;
        Ok(())
    }

    /// Pop the current frame, transferring exactly `return_len` values to the
    /// caller's operand region. `Some` when the entry frame returned.
    fn do_return(&mut self, operand_base: usize) -> RuntimeResult<Option<Vec<Val>>> {
        let (return_len, locals_base, opened_scope) = {
            let frame = self
                .frames
                .top()
                .expect("frame stack is non-empty inside the run loop");
            (
                frame.method.return_len as usize,
                frame.locals_base,
                frame.opened_scope,
            )
        };
        let mut returns = Vec::with_capacity(return_len);
        for _ in 0..return_len {
            returns.push(self.stack.pop_with_floor(operand_base)?);
        }
        returns.reverse();
        self.stack.truncate(locals_base);
        if opened_scope {
            self.close_scope()?;
        }
        self.frames.pop()?;
        if self.frames.is_empty() {
            return Ok(Some(returns));
        }
        for val in returns {
            self.stack.push(val)?;
        }
        Ok(None)
    }

    /// Close the innermost spending scope, returning its unspent funds to the
    /// caller scope, or to the output ledger when the entry scope closes.
    fn close_scope(&mut self) -> ExeResult<()> {
        let scope = self
            .scopes
            .pop()
            .expect("a frame that opened a scope closes it exactly once");
        match self.scopes.last_mut() {
            Some(parent) => {
                let depth = parent.depth;
                parent
                    .remaining
                    .merge(scope.remaining, depth)
                    .ok_or(ExeFailure::ArithmeticError)?;
                parent
                    .remaining
                    .merge(scope.approved, depth)
                    .ok_or(ExeFailure::ArithmeticError)?;
            }
            None => {
                self.ctx
                    .output_balances
                    .merge(scope.remaining, 0)
                    .ok_or(ExeFailure::ArithmeticError)?;
                self.ctx
                    .output_balances
                    .merge(scope.approved, 0)
                    .ok_or(ExeFailure::ArithmeticError)?;
            }
        }
        Ok(())
    }

    fn transfer_alph(
        &mut self,
        scope: Option<usize>,
        from: LockupScript,
        to: LockupScript,
        amount: U256,
    ) -> ExeResult<()> {
        let scope = self.scope_mut(scope)?;
        let depth = scope.depth;
        scope
            .remaining
            .use_alph(&from, amount)
            .ok_or(ExeFailure::NotEnoughBalance)?;
        self.ctx
            .output_balances
            .add_alph(to, amount, depth)
            .ok_or(ExeFailure::ArithmeticError)?;
        Ok(())
    }

    fn transfer_token(
        &mut self,
        scope: Option<usize>,
        from: LockupScript,
        to: LockupScript,
        token_id: TokenId,
        amount: U256,
    ) -> ExeResult<()> {
        let scope = self.scope_mut(scope)?;
        let depth = scope.depth;
        scope
            .remaining
            .use_token(&from, &token_id, amount)
            .ok_or(ExeFailure::NotEnoughBalance)?;
        self.ctx
            .output_balances
            .add_token(to, token_id, amount, depth)
            .ok_or(ExeFailure::ArithmeticError)?;
        Ok(())
    }

    fn scope_ref(&self, scope: Option<usize>) -> ExeResult<&BalanceScope> {
        let index = scope.ok_or(ExeFailure::NonPayableFrame)?;
        Ok(&self.scopes[index])
    }

    fn scope_mut(&mut self, scope: Option<usize>) -> ExeResult<&mut BalanceScope> {
        let index = scope.ok_or(ExeFailure::NonPayableFrame)?;
        Ok(&mut self.scopes[index])
    }

    fn self_contract(&self, code: &FrameCode) -> ExeResult<ContractId> {
        match code {
            FrameCode::Contract(id) => Ok(*id),
            FrameCode::Script(_) => Err(ExeFailure::ExpectAContract),
        }
    }

    fn self_lockup(&self, code: &FrameCode) -> ExeResult<LockupScript> {
        Ok(LockupScript::p2c(self.self_contract(code)?))
    }

    /// Set the program counter from a branch offset relative to the next
    /// instruction.
    fn branch(&mut self, offset: i16) -> ExeResult<()> {
        let frame = self
            .frames
            .top_mut()
            .expect("frame stack is non-empty inside the run loop");
        let target = frame.pc as i64 + offset as i64;
        if target < 0 || target as usize >= frame.method.instrs.len() {
            return Err(ExeFailure::InvalidInstrOffset);
        }
        frame.pc = target as usize;
        Ok(())
    }

    fn local_index(&self, operand_base: usize, index: u8) -> ExeResult<usize> {
        let frame = self
            .frames
            .top()
            .expect("frame stack is non-empty inside the run loop");
        debug_assert_eq!(frame.operand_base, operand_base);
        let slot = frame.locals_base + index as usize;
        if slot >= frame.operand_base {
            return Err(ExeFailure::InvalidLocalIndex(index as usize));
        }
        Ok(slot)
    }

    fn local(&self, operand_base: usize, index: u8) -> ExeResult<&Val> {
        let slot = self.local_index(operand_base, index)?;
        self.stack
            .get(slot)
            .ok_or(ExeFailure::InvalidLocalIndex(index as usize))
    }

    //
    // Typed operand pops
    //

    fn pop_u256(&mut self, floor: usize) -> ExeResult<U256> {
        self.stack.pop_with_floor(floor)?.as_u256()
    }

    fn pop_bool(&mut self, floor: usize) -> ExeResult<bool> {
        self.stack.pop_with_floor(floor)?.as_bool()
    }

    fn pop_lockup(&mut self, floor: usize) -> ExeResult<LockupScript> {
        self.stack.pop_with_floor(floor)?.as_lockup_script()
    }

    fn pop_bytes(&mut self, floor: usize) -> ExeResult<Vec<u8>> {
        match self.stack.pop_with_floor(floor)? {
            Val::ByteVec(bytes) => Ok(bytes),
            _ => Err(ExeFailure::InvalidType),
        }
    }

    fn pop_bytes32(&mut self, floor: usize) -> ExeResult<[u8; 32]> {
        let bytes = self.pop_bytes(floor)?;
        bytes.try_into().map_err(|_| ExeFailure::InvalidType)
    }

    fn pop_token_id(&mut self, floor: usize) -> ExeResult<TokenId> {
        Ok(TokenId(Hash256(self.pop_bytes32(floor)?)))
    }

    fn binary_u256(
        &mut self,
        floor: usize,
        op: fn(U256, U256) -> Option<U256>,
    ) -> ExeResult<()> {
        let b = self.pop_u256(floor)?;
        let a = self.pop_u256(floor)?;
        let result = op(a, b).ok_or(ExeFailure::ArithmeticError)?;
        self.stack.push(Val::U256(result))
    }

    fn compare_u256(&mut self, floor: usize, op: fn(&U256, &U256) -> bool) -> ExeResult<()> {
        let b = self.pop_u256(floor)?;
        let a = self.pop_u256(floor)?;
        self.stack.push(Val::Bool(op(&a, &b)))
    }
}
