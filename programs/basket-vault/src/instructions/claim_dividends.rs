use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    constants::*,
    engine,
    errors::BasketError,
    state::{Basket, Position},
    token_ledger::TokenLedger,
};

#[derive(Accounts)]
pub struct ClaimDividends<'info> {
    #[account(
        mut,
        seeds = [BASKET_SEED, basket.share_mint.as_ref()],
        bump = basket.bump,
        has_one = base_vault
    )]
    pub basket: Box<Account<'info, Basket>>,

    #[account(
        mut,
        seeds = [POSITION_SEED, basket.key().as_ref(), holder.key().as_ref()],
        bump = position.bump
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = holder_base_account.owner == holder.key() @ BasketError::Unauthorized,
        constraint = holder_base_account.mint == basket.base_mint @ BasketError::InvalidParameter
    )]
    pub holder_base_account: Box<Account<'info, TokenAccount>>,

    pub holder: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn claim_dividends(ctx: Context<ClaimDividends>) -> Result<()> {
    let basket_key = ctx.accounts.basket.key();
    let holder = ctx.accounts.holder.key();

    let ledger = TokenLedger::for_basket(&ctx.accounts.token_program, &ctx.accounts.basket)
        .with_vault(&ctx.accounts.base_vault)
        .with_party(&ctx.accounts.holder, Some(&*ctx.accounts.holder_base_account), None)
        .with_position(holder, &ctx.accounts.position);

    engine::claim(&ledger, &basket_key, &holder)?;

    let (basket, position) = ledger.into_records();
    if let Some(basket) = basket {
        ctx.accounts.basket.set_inner(basket);
    }
    if let Some(position) = position {
        ctx.accounts.position.set_inner(position);
    }
    Ok(())
}
