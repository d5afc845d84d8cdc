use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use anchor_lang::prelude::*;

use super::ledger::{Ledger, LedgerError, LedgerResult};
use crate::state::{Basket, Position};

#[derive(Default)]
struct Balances {
    /// (asset or share mint, owner) -> amount
    accounts: HashMap<(Pubkey, Pubkey), u64>,
    /// share mint -> supply
    supply: HashMap<Pubkey, u64>,
    /// (asset, authority) pairs with an open custody account
    custody: HashSet<(Pubkey, Pubkey)>,
    frozen: HashSet<Pubkey>,
}

#[derive(Default)]
struct Records {
    baskets: HashMap<Pubkey, Basket>,
    positions: HashMap<(Pubkey, Pubkey), Position>,
}

/// Process-local [`Ledger`] for simulation and tests.
///
/// Balances and records sit behind their own locks; `commit` writes a basket
/// and its position under one write lock and refuses a basket whose version
/// is not the direct successor of the stored one.
#[derive(Default)]
pub struct MemoryLedger {
    balances: Mutex<Balances>,
    records: RwLock<Records>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `owner` with `amount` of `asset` out of thin air.
    pub fn fund(&self, asset: &Pubkey, owner: &Pubkey, amount: u64) {
        let mut balances = self.balances();
        let entry = balances.accounts.entry((*asset, *owner)).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn balance(&self, asset: &Pubkey, owner: &Pubkey) -> u64 {
        self.balances()
            .accounts
            .get(&(*asset, *owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn share_supply(&self, share_mint: &Pubkey) -> u64 {
        self.balances()
            .supply
            .get(share_mint)
            .copied()
            .unwrap_or_default()
    }

    /// Makes every later mint or burn of `share_mint` fail.
    pub fn freeze_share_mint(&self, share_mint: &Pubkey) {
        self.balances().frozen.insert(*share_mint);
    }

    pub fn thaw_share_mint(&self, share_mint: &Pubkey) {
        self.balances().frozen.remove(share_mint);
    }

    fn balances(&self) -> MutexGuard<'_, Balances> {
        self.balances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_version(records: &Records, key: &Pubkey, basket: &Basket) -> LedgerResult<()> {
        let stored = records.baskets.get(key).map(|b| b.version);
        let in_sequence = match stored {
            Some(stored) => basket.version == stored.wrapping_add(1),
            None => basket.version == 0,
        };
        if in_sequence {
            Ok(())
        } else {
            Err(LedgerError::StaleRecord {
                basket: *key,
                stored: stored.unwrap_or_default(),
                incoming: basket.version,
            })
        }
    }
}

impl Balances {
    fn debit(&mut self, asset: &Pubkey, owner: &Pubkey, amount: u64) -> LedgerResult<()> {
        let available = self
            .accounts
            .get(&(*asset, *owner))
            .copied()
            .unwrap_or_default();
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                asset: *asset,
                owner: *owner,
                requested: amount,
                available,
            });
        }
        self.accounts.insert((*asset, *owner), available - amount);
        Ok(())
    }

    fn credit(&mut self, asset: &Pubkey, owner: &Pubkey, amount: u64) {
        let entry = self.accounts.entry((*asset, *owner)).or_default();
        *entry = entry.saturating_add(amount);
    }
}

impl Ledger for MemoryLedger {
    fn open_custody(&self, asset: &Pubkey, authority: &Pubkey) -> LedgerResult<Pubkey> {
        let mut balances = self.balances();
        if !balances.custody.insert((*asset, *authority)) {
            return Err(LedgerError::CustodyExists {
                asset: *asset,
                authority: *authority,
            });
        }
        balances.accounts.entry((*asset, *authority)).or_default();
        // Custody is addressed by its authority
        Ok(*authority)
    }

    fn close_custody(&self, asset: &Pubkey, authority: &Pubkey) -> LedgerResult<()> {
        let mut balances = self.balances();
        if !balances.custody.remove(&(*asset, *authority)) {
            return Err(LedgerError::UnknownAccount(*authority));
        }
        balances.accounts.remove(&(*asset, *authority));
        Ok(())
    }

    fn transfer(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> LedgerResult<()> {
        let mut balances = self.balances();
        balances.debit(asset, from, amount)?;
        balances.credit(asset, to, amount);
        Ok(())
    }

    fn mint_share_token(&self, share_mint: &Pubkey, holder: &Pubkey, amount: u64) -> LedgerResult<()> {
        let mut balances = self.balances();
        if balances.frozen.contains(share_mint) {
            return Err(LedgerError::Frozen(*share_mint));
        }
        let supply = balances.supply.entry(*share_mint).or_default();
        *supply = supply.saturating_add(amount);
        balances.credit(share_mint, holder, amount);
        Ok(())
    }

    fn burn_share_token(&self, share_mint: &Pubkey, holder: &Pubkey, amount: u64) -> LedgerResult<()> {
        let mut balances = self.balances();
        if balances.frozen.contains(share_mint) {
            return Err(LedgerError::Frozen(*share_mint));
        }
        balances.debit(share_mint, holder, amount)?;
        let supply = balances.supply.entry(*share_mint).or_default();
        *supply = supply.saturating_sub(amount);
        Ok(())
    }

    fn load_basket(&self, key: &Pubkey) -> Option<Basket> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.baskets.get(key).cloned()
    }

    fn store_basket(&self, key: &Pubkey, basket: &Basket) -> LedgerResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Self::check_version(&records, key, basket)?;
        records.baskets.insert(*key, basket.clone());
        Ok(())
    }

    fn load_position(&self, basket: &Pubkey, holder: &Pubkey) -> Option<Position> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        records.positions.get(&(*basket, *holder)).cloned()
    }

    fn store_position(&self, basket: &Pubkey, holder: &Pubkey, position: &Position) -> LedgerResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.positions.insert((*basket, *holder), position.clone());
        Ok(())
    }

    fn commit(
        &self,
        key: &Pubkey,
        basket: &Basket,
        position: Option<(&Pubkey, &Position)>,
    ) -> LedgerResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        Self::check_version(&records, key, basket)?;
        records.baskets.insert(*key, basket.clone());
        if let Some((holder, position)) = position {
            records.positions.insert((*key, *holder), position.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_moves_balance() {
        let ledger = MemoryLedger::new();
        let asset = Pubkey::new_unique();
        let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
        ledger.fund(&asset, &alice, 100);

        ledger.transfer(&asset, &alice, &bob, 60).unwrap();
        assert_eq!(ledger.balance(&asset, &alice), 40);
        assert_eq!(ledger.balance(&asset, &bob), 60);

        let err = ledger.transfer(&asset, &alice, &bob, 41).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                asset,
                owner: alice,
                requested: 41,
                available: 40,
            }
        );
        assert_eq!(ledger.balance(&asset, &alice), 40);
    }

    #[test]
    fn test_share_supply_tracks_mint_and_burn() {
        let ledger = MemoryLedger::new();
        let share_mint = Pubkey::new_unique();
        let holder = Pubkey::new_unique();

        ledger.mint_share_token(&share_mint, &holder, 1_000).unwrap();
        ledger.burn_share_token(&share_mint, &holder, 400).unwrap();
        assert_eq!(ledger.share_supply(&share_mint), 600);
        assert_eq!(ledger.balance(&share_mint, &holder), 600);
        assert!(ledger.burn_share_token(&share_mint, &holder, 601).is_err());

        ledger.freeze_share_mint(&share_mint);
        assert_eq!(
            ledger.mint_share_token(&share_mint, &holder, 1).unwrap_err(),
            LedgerError::Frozen(share_mint)
        );
        ledger.thaw_share_mint(&share_mint);
        assert!(ledger.mint_share_token(&share_mint, &holder, 1).is_ok());
    }

    #[test]
    fn test_custody_opens_once() {
        let ledger = MemoryLedger::new();
        let asset = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        assert_eq!(ledger.open_custody(&asset, &authority).unwrap(), authority);
        assert!(ledger.open_custody(&asset, &authority).is_err());
    }

    #[test]
    fn test_commit_rejects_stale_version() {
        let ledger = MemoryLedger::new();
        let key = Pubkey::new_unique();
        let holder = Pubkey::new_unique();
        let mut basket = Basket::default();
        ledger.commit(&key, &basket, None).unwrap();

        // Replaying version 0 on top of version 0 is a lost update
        let err = ledger.commit(&key, &basket, None).unwrap_err();
        assert!(matches!(err, LedgerError::StaleRecord { stored: 0, incoming: 0, .. }));

        basket.touch();
        let position = Position::open(key, holder, basket.dividend_index());
        ledger.commit(&key, &basket, Some((&holder, &position))).unwrap();
        assert_eq!(ledger.load_basket(&key).unwrap().version, 1);
        assert_eq!(ledger.load_position(&key, &holder), Some(position));
    }
}
