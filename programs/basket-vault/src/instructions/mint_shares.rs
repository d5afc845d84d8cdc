use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::{
    constants::*,
    engine,
    errors::BasketError,
    state::{Basket, Position},
    token_ledger::TokenLedger,
};

#[derive(Accounts)]
pub struct MintShares<'info> {
    #[account(
        mut,
        seeds = [BASKET_SEED, basket.share_mint.as_ref()],
        bump = basket.bump,
        has_one = base_vault,
        has_one = share_mint
    )]
    pub basket: Box<Account<'info, Basket>>,

    /// Opened on the holder's first mint
    #[account(
        init_if_needed,
        payer = holder,
        space = Position::LEN,
        seeds = [POSITION_SEED, basket.key().as_ref(), holder.key().as_ref()],
        bump
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(mut)]
    pub base_vault: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub share_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        constraint = holder_base_account.owner == holder.key() @ BasketError::Unauthorized,
        constraint = holder_base_account.mint == basket.base_mint @ BasketError::InvalidParameter
    )]
    pub holder_base_account: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = holder_share_account.owner == holder.key() @ BasketError::Unauthorized,
        constraint = holder_share_account.mint == basket.share_mint @ BasketError::InvalidParameter
    )]
    pub holder_share_account: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub holder: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn mint_shares(ctx: Context<MintShares>, base_in: u64, min_shares_out: u64) -> Result<()> {
    let basket_key = ctx.accounts.basket.key();
    let holder = ctx.accounts.holder.key();

    let ledger = TokenLedger::for_basket(&ctx.accounts.token_program, &ctx.accounts.basket)
        .with_vault(&ctx.accounts.base_vault)
        .with_share_mint(&ctx.accounts.share_mint)
        .with_party(
            &ctx.accounts.holder,
            Some(&*ctx.accounts.holder_base_account),
            Some(&*ctx.accounts.holder_share_account),
        )
        .with_position(holder, &ctx.accounts.position);

    engine::mint(&ledger, &basket_key, &holder, base_in, min_shares_out)?;

    let (basket, position) = ledger.into_records();
    if let Some(basket) = basket {
        ctx.accounts.basket.set_inner(basket);
    }
    if let Some(mut position) = position {
        position.bump = ctx.bumps.position;
        ctx.accounts.position.set_inner(position);
    }
    Ok(())
}
