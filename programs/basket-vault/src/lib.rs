use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod token_ledger;

use instructions::*;

declare_id!("CYCsfufytQXuWANcuj6Jnv2Rg8pFBVn9GYXbWuWufmaR");

#[program]
pub mod basket_vault {
    use super::*;

    /// Create a basket for a share mint whose authority is the basket PDA
    pub fn create_basket(ctx: Context<CreateBasket>, fee_bps: u16) -> Result<()> {
        instructions::create_basket(ctx, fee_bps)
    }

    /// Admin/oracle NAV update; the NAV is the raw Q64.64 value
    pub fn set_nav(ctx: Context<SetNav>, nav_q64: u128) -> Result<()> {
        instructions::set_nav(ctx, nav_q64)
    }

    /// Deposit base asset and receive shares at the current NAV
    pub fn mint_shares(ctx: Context<MintShares>, base_in: u64, min_shares_out: u64) -> Result<()> {
        instructions::mint_shares(ctx, base_in, min_shares_out)
    }

    /// Burn shares for base asset, less the redemption fee
    pub fn redeem_shares(
        ctx: Context<RedeemShares>,
        shares_in: u64,
        min_base_out: u64,
    ) -> Result<()> {
        instructions::redeem_shares(ctx, shares_in, min_base_out)
    }

    /// Withdraw accrued dividends
    pub fn claim_dividends(ctx: Context<ClaimDividends>) -> Result<()> {
        instructions::claim_dividends(ctx)
    }

    /// Admin pays a pro-rata dividend into custody
    pub fn deposit_dividends(ctx: Context<DepositDividends>, amount: u64) -> Result<()> {
        instructions::deposit_dividends(ctx, amount)
    }

    /// Admin halts or resumes everything except dividend claims
    pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
        instructions::set_pause(ctx, paused)
    }
}
