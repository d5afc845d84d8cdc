use anchor_lang::prelude::*;

use crate::{constants::*, engine, events::PauseUpdated, state::Basket};

#[derive(Accounts)]
pub struct SetPause<'info> {
    #[account(
        mut,
        seeds = [BASKET_SEED, basket.share_mint.as_ref()],
        bump = basket.bump
    )]
    pub basket: Box<Account<'info, Basket>>,

    pub admin: Signer<'info>,
}

/// No token movement: the basket account is updated in place.
pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
    let basket = engine::plan_set_pause(&ctx.accounts.basket, &ctx.accounts.admin.key(), paused)?;
    ctx.accounts.basket.set_inner(basket);

    emit!(PauseUpdated {
        basket: ctx.accounts.basket.key(),
        paused,
    });
    Ok(())
}
