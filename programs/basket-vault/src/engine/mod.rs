//! Accounting core: every operation loads the basket (and position), plans
//! the full result against that snapshot, then applies ledger movements and
//! commits both records through a [`journal::Journal`].

pub mod dividends;
pub mod journal;
pub mod ledger;
pub mod lifecycle;
pub mod locks;
pub mod memory;
pub mod mint_redeem;
pub mod nav;

pub use dividends::*;
pub use journal::*;
pub use ledger::*;
pub use lifecycle::*;
pub use locks::*;
pub use memory::*;
pub use mint_redeem::*;
pub use nav::*;

use anchor_lang::prelude::*;

use crate::{
    errors::BasketError,
    state::{Basket, Position},
};

pub(crate) fn load_basket<L: Ledger>(ledger: &L, key: &Pubkey) -> Result<Basket> {
    ledger
        .load_basket(key)
        .ok_or_else(|| error!(BasketError::BasketNotFound))
}

pub(crate) fn load_or_open_position<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    basket: &Basket,
    holder: &Pubkey,
) -> Position {
    ledger
        .load_position(basket_key, holder)
        .unwrap_or_else(|| Position::open(*basket_key, *holder, basket.dividend_index()))
}

/// Off-chain entry point: a [`Ledger`] plus one exclusive section per basket.
///
/// Each mutating call holds its basket's section from load to commit, so two
/// operations on the same basket never interleave while different baskets
/// proceed in parallel.
pub struct BasketEngine<L: Ledger> {
    ledger: L,
    locks: BasketLocks,
}

impl<L: Ledger> BasketEngine<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            locks: BasketLocks::default(),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Creates the basket for `share_mint` and returns its key.
    pub fn create_basket(
        &self,
        admin: &Pubkey,
        base_mint: &Pubkey,
        share_mint: &Pubkey,
        fee_bps: u16,
    ) -> Result<Pubkey> {
        let (key, bump) = Basket::address(share_mint);
        self.locks.with(&key, || {
            lifecycle::create_basket(&self.ledger, &key, bump, admin, base_mint, share_mint, fee_bps)
        })?;
        Ok(key)
    }

    pub fn set_nav(&self, basket: &Pubkey, admin: &Pubkey, nav_q64: u128) -> Result<NavReceipt> {
        self.locks
            .with(basket, || nav::set_nav(&self.ledger, basket, admin, nav_q64))
    }

    pub fn mint(
        &self,
        basket: &Pubkey,
        holder: &Pubkey,
        base_in: u64,
        min_shares_out: u64,
    ) -> Result<MintReceipt> {
        self.locks.with(basket, || {
            mint_redeem::mint(&self.ledger, basket, holder, base_in, min_shares_out)
        })
    }

    pub fn redeem(
        &self,
        basket: &Pubkey,
        holder: &Pubkey,
        shares_in: u64,
        min_base_out: u64,
    ) -> Result<RedeemReceipt> {
        self.locks.with(basket, || {
            mint_redeem::redeem(&self.ledger, basket, holder, shares_in, min_base_out)
        })
    }

    pub fn claim(&self, basket: &Pubkey, holder: &Pubkey) -> Result<ClaimReceipt> {
        self.locks
            .with(basket, || dividends::claim(&self.ledger, basket, holder))
    }

    pub fn deposit_dividends(
        &self,
        basket: &Pubkey,
        admin: &Pubkey,
        amount: u64,
    ) -> Result<DepositReceipt> {
        self.locks.with(basket, || {
            dividends::deposit_dividends(&self.ledger, basket, admin, amount)
        })
    }

    pub fn set_pause(&self, basket: &Pubkey, admin: &Pubkey, paused: bool) -> Result<Basket> {
        self.locks
            .with(basket, || lifecycle::set_pause(&self.ledger, basket, admin, paused))
    }

    pub fn basket(&self, key: &Pubkey) -> Option<Basket> {
        self.ledger.load_basket(key)
    }

    pub fn position(&self, basket: &Pubkey, holder: &Pubkey) -> Option<Position> {
        self.ledger.load_position(basket, holder)
    }
}
