use anchor_lang::prelude::*;

use crate::{
    constants::*,
    errors::BasketError,
    math::Q64,
};

#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct Basket {
    /// Authority allowed to set NAV, deposit dividends and pause
    pub admin: Pubkey,

    /// The single base asset held in custody
    pub base_mint: Pubkey,

    /// Share token mint; the basket PDA is its mint authority
    pub share_mint: Pubkey,

    /// Custody account for the base asset, owned by the basket PDA
    pub base_vault: Pubkey,

    /// Redemption fee in basis points (< 10000)
    pub fee_bps: u16,

    /// Mint, redeem, NAV updates and dividend deposits are rejected while set
    pub paused: bool,

    /// Value of one share in base units, Q64.64
    pub nav_q64: u128,

    /// Base units held in custody; mirrors the vault balance
    pub base_reserve: u64,

    /// Shares outstanding across all positions
    pub total_shares: u64,

    /// Cumulative dividend per share since creation, Q64.64
    pub acc_dividend_per_share_q64: u128,

    /// Dividends credited to holders and not yet claimed
    pub dividend_liability: u64,

    /// Bumped on every committed mutation
    pub version: u64,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Reserved space for future upgrades
    pub _reserved: [u8; 32],
}

impl Basket {
    pub const LEN: usize = 8 + // discriminator
        32 + // admin
        32 + // base_mint
        32 + // share_mint
        32 + // base_vault
        2 + // fee_bps
        1 + // paused
        16 + // nav_q64
        8 + // base_reserve
        8 + // total_shares
        16 + // acc_dividend_per_share_q64
        8 + // dividend_liability
        8 + // version
        1 + // bump
        32; // _reserved

    /// Basket PDA for a share mint.
    pub fn address(share_mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[BASKET_SEED, share_mint.as_ref()], &crate::ID)
    }

    pub fn new(
        admin: Pubkey,
        base_mint: Pubkey,
        share_mint: Pubkey,
        base_vault: Pubkey,
        fee_bps: u16,
        bump: u8,
    ) -> Result<Self> {
        require!(fee_bps < MAX_BPS, BasketError::InvalidParameter);
        Ok(Self {
            admin,
            base_mint,
            share_mint,
            base_vault,
            fee_bps,
            nav_q64: INITIAL_NAV_Q64,
            bump,
            ..Default::default()
        })
    }

    pub fn nav(&self) -> Q64 {
        Q64::from_raw(self.nav_q64)
    }

    pub fn dividend_index(&self) -> Q64 {
        Q64::from_raw(self.acc_dividend_per_share_q64)
    }

    pub fn assert_admin(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(self.admin, *signer, BasketError::Unauthorized);
        Ok(())
    }

    pub fn assert_active(&self) -> Result<()> {
        require!(!self.paused, BasketError::Paused);
        Ok(())
    }

    /// Reserve not earmarked for unclaimed dividends.
    pub fn free_reserve(&self) -> u64 {
        self.base_reserve.saturating_sub(self.dividend_liability)
    }

    /// Marks the record as the next committed revision.
    pub fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_basket_defaults() {
        let admin = Pubkey::new_unique();
        let basket = Basket::new(
            admin,
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            25,
            254,
        )
        .unwrap();

        assert_eq!(basket.nav(), Q64::ONE);
        assert_eq!(basket.total_shares, 0);
        assert_eq!(basket.base_reserve, 0);
        assert!(basket.dividend_index().is_zero());
        assert_eq!(basket.version, 0);
        assert!(basket.assert_admin(&admin).is_ok());
        assert!(basket.assert_admin(&Pubkey::new_unique()).is_err());
    }

    #[test]
    fn test_fee_bounds() {
        let make = |fee_bps| {
            Basket::new(
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                Pubkey::new_unique(),
                fee_bps,
                0,
            )
        };
        assert!(make(0).is_ok());
        assert!(make(MAX_BPS - 1).is_ok());
        let expected: anchor_lang::error::Error = BasketError::InvalidParameter.into();
        assert_eq!(make(MAX_BPS).unwrap_err(), expected);
    }

    #[test]
    fn test_free_reserve_excludes_liability() {
        let mut basket = Basket {
            base_reserve: 1_000,
            dividend_liability: 300,
            ..Default::default()
        };
        assert_eq!(basket.free_reserve(), 700);
        basket.paused = true;
        assert!(basket.assert_active().is_err());
    }

    #[test]
    fn test_len_matches_serialized_size() {
        let mut bytes = Vec::new();
        Basket::default().serialize(&mut bytes).unwrap();
        assert_eq!(bytes.len() + 8, Basket::LEN);
    }
}
