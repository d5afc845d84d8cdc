use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    constants::*,
    engine,
    errors::BasketError,
    state::Basket,
    token_ledger::TokenLedger,
};

#[derive(Accounts)]
pub struct CreateBasket<'info> {
    /// The single asset the basket holds
    pub base_mint: Box<Account<'info, Mint>>,

    /// Share token; its mint authority must already be the basket PDA
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        init,
        payer = admin,
        space = Basket::LEN,
        seeds = [BASKET_SEED, share_mint.key().as_ref()],
        bump
    )]
    pub basket: Box<Account<'info, Basket>>,

    /// Custody for the base asset, owned by the basket PDA
    #[account(
        init,
        payer = admin,
        associated_token::mint = base_mint,
        associated_token::authority = basket,
    )]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub rent: Sysvar<'info, Rent>,
}

pub fn create_basket(ctx: Context<CreateBasket>, fee_bps: u16) -> Result<()> {
    let basket_key = ctx.accounts.basket.key();
    let share_mint = ctx.accounts.share_mint.key();

    require!(
        ctx.accounts.share_mint.mint_authority == COption::Some(basket_key),
        BasketError::InvalidParameter
    );
    require!(
        ctx.accounts.share_mint.supply == 0,
        BasketError::InvalidParameter
    );

    let ledger = TokenLedger::new(
        &ctx.accounts.token_program,
        ctx.accounts.basket.to_account_info(),
        share_mint,
        ctx.bumps.basket,
    )
    .with_vault(&ctx.accounts.base_vault);

    let basket = engine::create_basket(
        &ledger,
        &basket_key,
        ctx.bumps.basket,
        &ctx.accounts.admin.key(),
        &ctx.accounts.base_mint.key(),
        &share_mint,
        fee_bps,
    )?;
    ctx.accounts.basket.set_inner(basket);

    Ok(())
}
