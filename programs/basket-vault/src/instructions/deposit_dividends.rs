use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    constants::*,
    engine,
    errors::BasketError,
    state::Basket,
    token_ledger::TokenLedger,
};

#[derive(Accounts)]
pub struct DepositDividends<'info> {
    #[account(
        mut,
        seeds = [BASKET_SEED, basket.share_mint.as_ref()],
        bump = basket.bump,
        has_one = base_vault
    )]
    pub basket: Box<Account<'info, Basket>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = admin_base_account.owner == admin.key() @ BasketError::Unauthorized,
        constraint = admin_base_account.mint == basket.base_mint @ BasketError::InvalidParameter
    )]
    pub admin_base_account: Box<Account<'info, TokenAccount>>,

    pub admin: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

pub fn deposit_dividends(ctx: Context<DepositDividends>, amount: u64) -> Result<()> {
    let basket_key = ctx.accounts.basket.key();
    let admin = ctx.accounts.admin.key();

    let ledger = TokenLedger::for_basket(&ctx.accounts.token_program, &ctx.accounts.basket)
        .with_vault(&ctx.accounts.base_vault)
        .with_party(&ctx.accounts.admin, Some(&*ctx.accounts.admin_base_account), None);

    engine::deposit_dividends(&ledger, &basket_key, &admin, amount)?;

    if let (Some(basket), _) = ledger.into_records() {
        ctx.accounts.basket.set_inner(basket);
    }
    Ok(())
}
