/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The asset ledger for a single lockup script within one spending scope.

use std::collections::BTreeMap;

use crate::error::{ExeFailure, ExeResult};
use crate::types::{LockupScript, TokenId, TxOutput};
use crate::u256::U256;

/// Per-lockup holdings of the native coin and tokens.
///
/// All mutation goes through checked arithmetic; every operation that returns
/// `None` leaves the ledger exactly as it was. The bulk [add](Self::add) and
/// [sub](Self::sub) merges are computed into a scratch copy and committed only
/// when every asset-level step succeeded, so a failed merge can never leave a
/// partially mutated ledger behind an aliasing reference.
///
/// Zero-amount token entries may exist transiently inside the map; they are
/// filtered when the ledger is projected to a transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalancesPerLockup {
    pub alph_amount: U256,
    pub tokens: BTreeMap<TokenId, U256>,
    /// Call-nesting depth at which this ledger was created. Bookkeeping for
    /// cleanup on scope exit; never affects arithmetic.
    pub scope_depth: usize,
}

impl BalancesPerLockup {
    pub fn empty(scope_depth: usize) -> Self {
        Self {
            alph_amount: U256::ZERO,
            tokens: BTreeMap::new(),
            scope_depth,
        }
    }

    pub fn from_alph(amount: U256, scope_depth: usize) -> Self {
        Self {
            alph_amount: amount,
            tokens: BTreeMap::new(),
            scope_depth,
        }
    }

    pub fn from_token(id: TokenId, amount: U256, scope_depth: usize) -> Self {
        Self {
            alph_amount: U256::ZERO,
            tokens: BTreeMap::from([(id, amount)]),
            scope_depth,
        }
    }

    /// Amount held for a token, or `None` if the ledger has no entry for it.
    /// An absent entry is distinct from a zero amount.
    pub fn token_amount(&self, id: &TokenId) -> Option<U256> {
        self.tokens.get(id).copied()
    }

    /// True when the ledger holds no coin and no non-zero token amount.
    pub fn is_empty(&self) -> bool {
        self.alph_amount.is_zero() && self.tokens.values().all(U256::is_zero)
    }

    pub fn add_alph(&mut self, amount: U256) -> Option<()> {
        self.alph_amount = self.alph_amount.checked_add(amount)?;
        Some(())
    }

    pub fn sub_alph(&mut self, amount: U256) -> Option<()> {
        self.alph_amount = self.alph_amount.checked_sub(amount)?;
        Some(())
    }

    pub fn add_token(&mut self, id: TokenId, amount: U256) -> Option<()> {
        let current = self.tokens.get(&id).copied().unwrap_or(U256::ZERO);
        let updated = current.checked_add(amount)?;
        self.tokens.insert(id, updated);
        Some(())
    }

    /// `None` if the token entry is absent or the amount underflows.
    pub fn sub_token(&mut self, id: &TokenId, amount: U256) -> Option<()> {
        let current = self.tokens.get(id)?;
        let updated = current.checked_sub(amount)?;
        self.tokens.insert(*id, updated);
        Some(())
    }

    /// Merge another ledger into this one, asset by asset. Creates token
    /// entries that do not yet exist. Fails as a whole on any overflow, with
    /// no mutation at all.
    pub fn add(&mut self, other: &BalancesPerLockup) -> Option<()> {
        let alph_amount = self.alph_amount.checked_add(other.alph_amount)?;
        let mut tokens = self.tokens.clone();
        for (id, amount) in other.tokens.iter() {
            let current = tokens.get(id).copied().unwrap_or(U256::ZERO);
            tokens.insert(*id, current.checked_add(*amount)?);
        }
        self.alph_amount = alph_amount;
        self.tokens = tokens;
        Some(())
    }

    /// Deduct another ledger from this one. Fails as a whole if a token in
    /// `other` is absent in `self` or any amount underflows; no mutation on
    /// failure.
    pub fn sub(&mut self, other: &BalancesPerLockup) -> Option<()> {
        let alph_amount = self.alph_amount.checked_sub(other.alph_amount)?;
        let mut tokens = self.tokens.clone();
        for (id, amount) in other.tokens.iter() {
            let current = tokens.get(id)?;
            let updated = current.checked_sub(*amount)?;
            tokens.insert(*id, updated);
        }
        self.alph_amount = alph_amount;
        self.tokens = tokens;
        Some(())
    }

    /// Project the ledger to at most one transaction output.
    ///
    /// All-zero ledgers produce no output. Tokens without a coin amount are
    /// unrepresentable and fail with [ExeFailure::InvalidOutputBalances]. The
    /// token list carries the non-zero entries in token-id order.
    pub fn to_output(&self, lockup_script: LockupScript) -> ExeResult<Option<TxOutput>> {
        let tokens: Vec<(TokenId, U256)> = self
            .tokens
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(id, amount)| (*id, *amount))
            .collect();
        if self.alph_amount.is_zero() {
            if tokens.is_empty() {
                return Ok(None);
            }
            return Err(ExeFailure::InvalidOutputBalances);
        }
        Ok(Some(TxOutput {
            lockup_script,
            alph_amount: self.alph_amount,
            tokens,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash256;

    fn token(n: u8) -> TokenId {
        TokenId(Hash256([n; 32]))
    }

    fn lockup() -> LockupScript {
        LockupScript::P2pkh(Hash256([1; 32]))
    }

    #[test]
    fn add_then_sub_is_identity() {
        let mut ledger = BalancesPerLockup::from_alph(U256::from(100), 0);
        ledger.add_token(token(1), U256::from(5)).unwrap();
        let other = {
            let mut b = BalancesPerLockup::from_alph(U256::from(40), 0);
            b.add_token(token(1), U256::from(3)).unwrap();
            b.add_token(token(2), U256::from(7)).unwrap();
            b
        };
        let before = ledger.clone();
        ledger.add(&other).unwrap();
        ledger.sub(&other).unwrap();
        assert_eq!(ledger.alph_amount, before.alph_amount);
        assert_eq!(ledger.token_amount(&token(1)), before.token_amount(&token(1)));
        // token 2 went through zero, the entry itself is allowed to remain
        assert_eq!(ledger.token_amount(&token(2)), Some(U256::ZERO));
        assert!(ledger.to_output(lockup()).unwrap().unwrap().tokens.len() == 1);
    }

    #[test]
    fn failed_sub_leaves_ledger_unchanged() {
        let mut ledger = BalancesPerLockup::from_alph(U256::from(100), 0);
        ledger.add_token(token(1), U256::from(5)).unwrap();
        let before = ledger.clone();

        // more alph than held: alph would succeed partially if mutation were
        // in place, the token step then underflows
        let mut other = BalancesPerLockup::from_alph(U256::from(10), 0);
        other.add_token(token(1), U256::from(6)).unwrap();
        assert_eq!(ledger.sub(&other), None);
        assert_eq!(ledger, before);

        // token absent entirely
        let other = BalancesPerLockup::from_token(token(9), U256::ONE, 0);
        assert_eq!(ledger.sub(&other), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn failed_add_leaves_ledger_unchanged() {
        let mut ledger = BalancesPerLockup::from_alph(U256::from(1), 0);
        ledger.add_token(token(1), U256::from(1)).unwrap();
        let before = ledger.clone();
        let mut other = BalancesPerLockup::from_alph(U256::from(1), 0);
        other.add_token(token(1), U256::MAX).unwrap();
        assert_eq!(ledger.add(&other), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn to_output_contract() {
        // all zero: no output
        let empty = BalancesPerLockup::empty(0);
        assert_eq!(empty.to_output(lockup()).unwrap(), None);

        // tokens without coin: unrepresentable
        let dust = BalancesPerLockup::from_token(token(1), U256::ONE, 0);
        assert_eq!(
            dust.to_output(lockup()),
            Err(ExeFailure::InvalidOutputBalances)
        );

        // zero-amount entries are filtered, remainder sorted by token id
        let mut full = BalancesPerLockup::from_alph(U256::from(9), 0);
        full.add_token(token(3), U256::from(3)).unwrap();
        full.add_token(token(2), U256::ZERO).unwrap();
        full.add_token(token(1), U256::from(1)).unwrap();
        let output = full.to_output(lockup()).unwrap().unwrap();
        assert_eq!(output.alph_amount, U256::from(9));
        assert_eq!(
            output.tokens,
            vec![(token(1), U256::from(1)), (token(3), U256::from(3))]
        );
    }
}
