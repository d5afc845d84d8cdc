use anchor_lang::prelude::*;

use super::{
    ledger::{ledger_failure, Ledger},
    load_basket,
};
use crate::{
    errors::BasketError,
    events::{BasketCreated, PauseUpdated},
    state::Basket,
};

/// Creates the basket record at `basket_key` and opens its custody account.
pub fn create_basket<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    bump: u8,
    admin: &Pubkey,
    base_mint: &Pubkey,
    share_mint: &Pubkey,
    fee_bps: u16,
) -> Result<Basket> {
    require!(
        ledger.load_basket(basket_key).is_none(),
        BasketError::AlreadyExists
    );

    // Validate before the ledger is touched
    let mut basket = Basket::new(
        *admin,
        *base_mint,
        *share_mint,
        Pubkey::default(),
        fee_bps,
        bump,
    )?;
    basket.base_vault = ledger
        .open_custody(base_mint, basket_key)
        .map_err(ledger_failure)?;

    if let Err(err) = ledger.commit(basket_key, &basket, None) {
        if let Err(close_err) = ledger.close_custody(base_mint, basket_key) {
            msg!("closing custody for {} failed: {}", basket_key, close_err);
        }
        return Err(ledger_failure(err));
    }

    emit!(BasketCreated {
        basket: *basket_key,
        admin: *admin,
        base_mint: *base_mint,
        share_mint: *share_mint,
        base_vault: basket.base_vault,
        fee_bps,
    });

    Ok(basket)
}

pub fn plan_set_pause(basket: &Basket, admin: &Pubkey, paused: bool) -> Result<Basket> {
    basket.assert_admin(admin)?;
    let mut basket = basket.clone();
    basket.paused = paused;
    basket.touch();
    Ok(basket)
}

/// Halts or resumes mint, redeem, NAV updates and dividend deposits.
/// Claims are unaffected.
pub fn set_pause<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    admin: &Pubkey,
    paused: bool,
) -> Result<Basket> {
    let basket = load_basket(ledger, basket_key)?;
    let basket = plan_set_pause(&basket, admin, paused)?;
    ledger
        .commit(basket_key, &basket, None)
        .map_err(ledger_failure)?;

    emit!(PauseUpdated {
        basket: *basket_key,
        paused,
    });

    Ok(basket)
}
