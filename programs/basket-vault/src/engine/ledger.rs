use anchor_lang::prelude::*;
use thiserror::Error;

use crate::{errors::BasketError, state::{Basket, Position}};

/// Failures reported by a [`Ledger`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: {owner} holds {available} of {asset}, needs {requested}")]
    InsufficientFunds {
        asset: Pubkey,
        owner: Pubkey,
        requested: u64,
        available: u64,
    },

    #[error("account {0} is not known to this ledger")]
    UnknownAccount(Pubkey),

    #[error("asset {0} is not handled by this ledger")]
    UnknownAsset(Pubkey),

    #[error("custody for {asset} under {authority} already exists")]
    CustodyExists { asset: Pubkey, authority: Pubkey },

    #[error("share mint {0} is frozen")]
    Frozen(Pubkey),

    #[error("stale basket record {basket}: stored version {stored}, incoming {incoming}")]
    StaleRecord {
        basket: Pubkey,
        stored: u64,
        incoming: u64,
    },

    #[error("token program call failed: {0}")]
    Cpi(String),
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl From<anchor_lang::error::Error> for LedgerError {
    fn from(err: anchor_lang::error::Error) -> Self {
        LedgerError::Cpi(err.to_string())
    }
}

/// Everything the accounting engine needs from the outside world: moving the
/// base asset, minting and burning the share token, and persisting records.
///
/// Custody is addressed by the basket key: `transfer(asset, basket, holder, n)`
/// pays out of the basket's vault.
pub trait Ledger {
    /// Opens an empty custody account for `asset` owned by `authority`.
    fn open_custody(&self, asset: &Pubkey, authority: &Pubkey) -> LedgerResult<Pubkey>;

    /// Undoes `open_custody` for a basket whose record was never committed.
    fn close_custody(&self, asset: &Pubkey, authority: &Pubkey) -> LedgerResult<()>;

    fn transfer(
        &self,
        asset: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> LedgerResult<()>;

    fn mint_share_token(
        &self,
        share_mint: &Pubkey,
        holder: &Pubkey,
        amount: u64,
    ) -> LedgerResult<()>;

    fn burn_share_token(
        &self,
        share_mint: &Pubkey,
        holder: &Pubkey,
        amount: u64,
    ) -> LedgerResult<()>;

    fn load_basket(&self, key: &Pubkey) -> Option<Basket>;

    fn store_basket(&self, key: &Pubkey, basket: &Basket) -> LedgerResult<()>;

    fn load_position(&self, basket: &Pubkey, holder: &Pubkey) -> Option<Position>;

    fn store_position(
        &self,
        basket: &Pubkey,
        holder: &Pubkey,
        position: &Position,
    ) -> LedgerResult<()>;

    /// Persists a basket together with the position it was updated with.
    ///
    /// Implementations backed by shared storage override this to write both
    /// records under one critical section.
    fn commit(
        &self,
        key: &Pubkey,
        basket: &Basket,
        position: Option<(&Pubkey, &Position)>,
    ) -> LedgerResult<()> {
        self.store_basket(key, basket)?;
        if let Some((holder, position)) = position {
            self.store_position(key, holder, position)?;
        }
        Ok(())
    }
}

/// Logs the adapter failure and surfaces it as `BasketError::LedgerError`.
pub fn ledger_failure(err: LedgerError) -> anchor_lang::error::Error {
    msg!("ledger adapter failure: {}", err);
    error!(BasketError::LedgerError)
}
