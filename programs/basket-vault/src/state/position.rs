use anchor_lang::prelude::*;

use crate::{constants::*, errors::BasketError, math::Q64};

#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Position {
    /// Associated basket
    pub basket: Pubkey,

    /// Holder wallet
    pub holder: Pubkey,

    /// Shares owned in this basket
    pub shares: u64,

    /// Basket dividend index at the last settlement, Q64.64
    pub last_index_q64: u128,

    /// Dividends settled but not yet withdrawn, Q64.64 base units
    pub unclaimed_q64: u128,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Reserved space for future upgrades
    pub _reserved: [u8; 16],
}

impl Position {
    pub const LEN: usize = 8 + // discriminator
        32 + // basket
        32 + // holder
        8 + // shares
        16 + // last_index_q64
        16 + // unclaimed_q64
        1 + // bump
        16; // _reserved

    pub fn address(basket: &Pubkey, holder: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[POSITION_SEED, basket.as_ref(), holder.as_ref()],
            &crate::ID,
        )
    }

    /// A fresh position starts at the current index so it never earns
    /// dividends distributed before it existed.
    pub fn open(basket: Pubkey, holder: Pubkey, index: Q64) -> Self {
        Self {
            basket,
            holder,
            last_index_q64: index.raw(),
            ..Default::default()
        }
    }

    /// Uninitialized accounts deserialize to all zeroes.
    pub fn is_open(&self) -> bool {
        self.holder != Pubkey::default()
    }

    pub fn last_index(&self) -> Q64 {
        Q64::from_raw(self.last_index_q64)
    }

    pub fn unclaimed(&self) -> Q64 {
        Q64::from_raw(self.unclaimed_q64)
    }

    /// Credits dividends accrued since the last settlement and moves the
    /// checkpoint to `index`. Returns the amount credited.
    pub fn settle(&mut self, index: Q64) -> Result<Q64> {
        let delta = index.checked_sub(self.last_index())?;
        let accrued = delta.mul_int(self.shares)?;
        self.unclaimed_q64 = self.unclaimed().checked_add(accrued)?.raw();
        self.last_index_q64 = index.raw();
        Ok(accrued)
    }

    /// Whole base units that a claim can pay out.
    pub fn claimable(&self) -> u64 {
        u64::try_from(self.unclaimed().floor()).unwrap_or(u64::MAX)
    }

    /// Removes `amount` whole base units from the unclaimed balance; the
    /// fractional remainder stays with the holder.
    pub fn debit_claim(&mut self, amount: u64) -> Result<()> {
        let remaining = self.unclaimed().checked_sub(Q64::from_int(amount))?;
        self.unclaimed_q64 = remaining.raw();
        Ok(())
    }

    pub fn credit_shares(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or(BasketError::Overflow)?;
        Ok(())
    }

    pub fn debit_shares(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_sub(shares)
            .ok_or(BasketError::InsufficientBalance)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rounding;

    fn holder_with(shares: u64) -> Position {
        let mut position = Position::open(Pubkey::new_unique(), Pubkey::new_unique(), Q64::ZERO);
        position.shares = shares;
        position
    }

    #[test]
    fn test_settle_accrues_index_delta() {
        let mut position = holder_with(1_000_000);
        let index = Q64::from_ratio(1, 10, Rounding::Up).unwrap();

        let accrued = position.settle(index).unwrap();
        assert_eq!(accrued.floor(), 100_000);
        assert_eq!(position.claimable(), 100_000);
        assert_eq!(position.last_index(), index);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let mut position = holder_with(777);
        let index = Q64::from_ratio(3, 7, Rounding::Up).unwrap();
        position.settle(index).unwrap();
        let snapshot = position.clone();

        let accrued = position.settle(index).unwrap();
        assert!(accrued.is_zero());
        assert_eq!(position, snapshot);
    }

    #[test]
    fn test_settle_rejects_index_regression() {
        let mut position = holder_with(10);
        position.settle(Q64::from_int(2)).unwrap();
        let expected: anchor_lang::error::Error = BasketError::Underflow.into();
        assert_eq!(position.settle(Q64::ONE).unwrap_err(), expected);
    }

    #[test]
    fn test_open_starts_at_current_index() {
        let index = Q64::from_int(5);
        let mut position = Position::open(Pubkey::new_unique(), Pubkey::new_unique(), index);
        assert!(position.is_open());
        position.shares = 100;
        position.settle(index).unwrap();
        assert_eq!(position.claimable(), 0);
        assert!(!Position::default().is_open());
    }

    #[test]
    fn test_debit_claim_keeps_dust() {
        let mut position = holder_with(3);
        position.settle(Q64::from_ratio(1, 2, Rounding::Down).unwrap()).unwrap();
        assert_eq!(position.claimable(), 1);

        position.debit_claim(1).unwrap();
        assert_eq!(position.claimable(), 0);
        assert_eq!(position.unclaimed(), Q64::from_ratio(1, 2, Rounding::Down).unwrap());
    }

    #[test]
    fn test_share_bookkeeping() {
        let mut position = holder_with(5);
        position.credit_shares(10).unwrap();
        assert_eq!(position.shares, 15);
        position.debit_shares(15).unwrap();
        assert_eq!(position.shares, 0);
        let expected: anchor_lang::error::Error = BasketError::InsufficientBalance.into();
        assert_eq!(position.debit_shares(1).unwrap_err(), expected);
    }
}
