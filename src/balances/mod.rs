/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The execution-scoped asset ledgers.
//!
//! A [Balances] value plays three lifecycle roles, all with the same type:
//! the *remaining* ledger queried by the `*Remaining` instructions, the
//! *approved* ledger fed by `Approve*` and consumed when a payable call opens
//! a new scope, and the *output* ledger accumulated by transfers and drained
//! into transaction outputs at the end of execution.

pub mod per_lockup;
pub use per_lockup::BalancesPerLockup;

use crate::error::ExeResult;
use crate::types::{LockupScript, TokenId, TxOutput};
use crate::u256::U256;

/// Ordered collection of `(LockupScript, BalancesPerLockup)` pairs. Each
/// lockup script appears at most once; first-seen order is preserved, which
/// fixes the order of generated outputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances(Vec<(LockupScript, BalancesPerLockup)>);

impl Balances {
    pub fn new() -> Self {
        Balances(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, lockup: &LockupScript) -> Option<&BalancesPerLockup> {
        self.0
            .iter()
            .find(|(key, _)| key == lockup)
            .map(|(_, ledger)| ledger)
    }

    fn get_mut(&mut self, lockup: &LockupScript) -> Option<&mut BalancesPerLockup> {
        self.0
            .iter_mut()
            .find(|(key, _)| key == lockup)
            .map(|(_, ledger)| ledger)
    }

    fn entry_mut(&mut self, lockup: LockupScript, scope_depth: usize) -> &mut BalancesPerLockup {
        if let Some(index) = self.0.iter().position(|(key, _)| *key == lockup) {
            return &mut self.0[index].1;
        }
        self.0.push((lockup, BalancesPerLockup::empty(scope_depth)));
        &mut self.0.last_mut().unwrap().1
    }

    /// Coin amount held for the lockup script; an absent entry reads as zero.
    pub fn alph_amount(&self, lockup: &LockupScript) -> U256 {
        self.get(lockup).map_or(U256::ZERO, |b| b.alph_amount)
    }

    /// Token amount held for the lockup script. `None` when the entry or the
    /// token mapping is absent, which callers report distinctly from zero.
    pub fn token_amount(&self, lockup: &LockupScript, id: &TokenId) -> Option<U256> {
        self.get(lockup).and_then(|b| b.token_amount(id))
    }

    /// Insert-or-merge a coin amount. New entries are created at the given
    /// scope depth.
    pub fn add_alph(&mut self, lockup: LockupScript, amount: U256, scope_depth: usize) -> Option<()> {
        self.entry_mut(lockup, scope_depth).add_alph(amount)
    }

    /// Insert-or-merge a token amount.
    pub fn add_token(
        &mut self,
        lockup: LockupScript,
        id: TokenId,
        amount: U256,
        scope_depth: usize,
    ) -> Option<()> {
        self.entry_mut(lockup, scope_depth).add_token(id, amount)
    }

    /// Take a coin amount out of the ledger (the "use approved amount"
    /// primitive behind `Approve*` and `Transfer*`). Removes the entry when it
    /// becomes empty. `None` on insufficient funds, with no mutation.
    pub fn use_alph(&mut self, lockup: &LockupScript, amount: U256) -> Option<()> {
        self.get_mut(lockup)?.sub_alph(amount)?;
        self.remove_if_empty(lockup);
        Some(())
    }

    /// Take a token amount out of the ledger. `None` if the entry or token is
    /// absent or the amount underflows, with no mutation.
    pub fn use_token(&mut self, lockup: &LockupScript, id: &TokenId, amount: U256) -> Option<()> {
        self.get_mut(lockup)?.sub_token(id, amount)?;
        self.remove_if_empty(lockup);
        Some(())
    }

    /// Remove and return the whole per-lockup ledger.
    pub fn use_all(&mut self, lockup: &LockupScript) -> Option<BalancesPerLockup> {
        let index = self.0.iter().position(|(key, _)| key == lockup)?;
        Some(self.0.remove(index).1)
    }

    fn remove_if_empty(&mut self, lockup: &LockupScript) {
        if let Some(index) = self
            .0
            .iter()
            .position(|(key, ledger)| key == lockup && ledger.is_empty())
        {
            self.0.remove(index);
        }
    }

    /// Fold another ledger collection into this one, entry by entry. Entries
    /// moving in are re-tagged to the given scope depth. Fails as a whole on
    /// arithmetic overflow; the merge is computed into a scratch copy so a
    /// failure leaves `self` untouched.
    pub fn merge(&mut self, other: Balances, scope_depth: usize) -> Option<()> {
        let mut merged = self.clone();
        for (lockup, mut ledger) in other.0 {
            match merged.get_mut(&lockup) {
                Some(existing) => existing.add(&ledger)?,
                None => {
                    ledger.scope_depth = scope_depth;
                    merged.0.push((lockup, ledger));
                }
            }
        }
        *self = merged;
        Some(())
    }

    /// Drain the collection into zero-or-one output per lockup script, in
    /// first-seen order.
    pub fn into_outputs(self) -> ExeResult<Vec<TxOutput>> {
        let mut outputs = Vec::new();
        for (lockup, ledger) in self.0 {
            if let Some(output) = ledger.to_output(lockup)? {
                outputs.push(output);
            }
        }
        Ok(outputs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(LockupScript, BalancesPerLockup)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Hash256;

    fn lockup(n: u8) -> LockupScript {
        LockupScript::P2pkh(Hash256([n; 32]))
    }

    fn token(n: u8) -> TokenId {
        TokenId(Hash256([n; 32]))
    }

    #[test]
    fn each_lockup_script_appears_at_most_once() {
        let mut balances = Balances::new();
        balances.add_alph(lockup(1), U256::from(10), 0).unwrap();
        balances.add_alph(lockup(1), U256::from(5), 0).unwrap();
        balances.add_alph(lockup(2), U256::from(1), 0).unwrap();
        assert_eq!(balances.iter().count(), 2);
        assert_eq!(balances.alph_amount(&lockup(1)), U256::from(15));
    }

    #[test]
    fn use_removes_emptied_entries() {
        let mut balances = Balances::new();
        balances.add_alph(lockup(1), U256::from(10), 0).unwrap();
        assert_eq!(balances.use_alph(&lockup(1), U256::from(11)), None);
        balances.use_alph(&lockup(1), U256::from(10)).unwrap();
        assert!(balances.get(&lockup(1)).is_none());
    }

    #[test]
    fn absent_token_is_distinct_from_zero() {
        let mut balances = Balances::new();
        balances.add_alph(lockup(1), U256::from(10), 0).unwrap();
        balances
            .add_token(lockup(1), token(7), U256::from(3), 0)
            .unwrap();
        assert_eq!(balances.token_amount(&lockup(1), &token(9)), None);
        assert_eq!(
            balances.token_amount(&lockup(1), &token(7)),
            Some(U256::from(3))
        );
        assert_eq!(balances.alph_amount(&lockup(9)), U256::ZERO);
    }

    #[test]
    fn use_all_takes_the_whole_entry() {
        let mut balances = Balances::new();
        balances.add_alph(lockup(1), U256::from(10), 0).unwrap();
        balances
            .add_token(lockup(1), token(2), U256::from(3), 0)
            .unwrap();
        balances.add_alph(lockup(2), U256::from(1), 0).unwrap();

        let taken = balances.use_all(&lockup(1)).unwrap();
        assert_eq!(taken.alph_amount, U256::from(10));
        assert_eq!(taken.token_amount(&token(2)), Some(U256::from(3)));
        assert!(balances.get(&lockup(1)).is_none());
        assert_eq!(balances.use_all(&lockup(1)), None);
        // other entries untouched
        assert_eq!(balances.alph_amount(&lockup(2)), U256::from(1));
    }

    #[test]
    fn merge_is_atomic_on_overflow() {
        let mut balances = Balances::new();
        balances.add_alph(lockup(1), U256::MAX, 0).unwrap();
        balances.add_alph(lockup(2), U256::from(5), 0).unwrap();
        let before = balances.clone();

        let mut incoming = Balances::new();
        incoming.add_alph(lockup(2), U256::from(1), 1).unwrap();
        incoming.add_alph(lockup(1), U256::ONE, 1).unwrap();
        assert_eq!(balances.merge(incoming, 0), None);
        assert_eq!(balances, before);
    }

    #[test]
    fn outputs_preserve_first_seen_order() {
        let mut balances = Balances::new();
        balances.add_alph(lockup(3), U256::from(1), 0).unwrap();
        balances.add_alph(lockup(1), U256::from(2), 0).unwrap();
        let outputs = balances.into_outputs().unwrap();
        assert_eq!(outputs[0].lockup_script, lockup(3));
        assert_eq!(outputs[1].lockup_script, lockup(1));
    }
}
