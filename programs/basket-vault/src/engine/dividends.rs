use anchor_lang::prelude::*;

use super::{
    journal::{Journal, Movement},
    ledger::Ledger,
    load_basket,
};
use crate::{
    errors::BasketError,
    events::{DividendsClaimed, DividendsDeposited},
    math::{per_share, Q64, Rounding},
    state::{Basket, Position},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub amount: u64,
    pub basket: Basket,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    pub amount: u64,
    pub index_increment_q64: u128,
    pub basket: Basket,
}

/// Adds `amount` of new revenue to the reserve and spreads it over the
/// shares outstanding. With no shares outstanding the amount stays in the
/// reserve without touching the index.
pub fn inject(basket: &mut Basket, amount: u64) -> Result<Q64> {
    basket.base_reserve = basket
        .base_reserve
        .checked_add(amount)
        .ok_or(BasketError::Overflow)?;
    credit_index(basket, amount)
}

/// Credits `amount` to holders through the dividend index and books it as a
/// liability of the reserve.
///
/// The per-share increment rounds up; claims round down and are capped by
/// `dividend_liability`, so holders can never withdraw more than was
/// credited.
pub fn credit_index(basket: &mut Basket, amount: u64) -> Result<Q64> {
    if amount == 0 || basket.total_shares == 0 {
        return Ok(Q64::ZERO);
    }
    let increment = per_share(amount, basket.total_shares, Rounding::Up)?;
    basket.acc_dividend_per_share_q64 = basket.dividend_index().checked_add(increment)?.raw();
    basket.dividend_liability = basket
        .dividend_liability
        .checked_add(amount)
        .ok_or(BasketError::Overflow)?;
    Ok(increment)
}

pub fn plan_claim(basket: &Basket, position: Option<&Position>) -> Result<ClaimReceipt> {
    let mut position = position
        .cloned()
        .ok_or(BasketError::NothingToClaim)?;
    let mut basket = basket.clone();
    position.settle(basket.dividend_index())?;

    let amount = position.claimable().min(basket.dividend_liability);
    require!(amount > 0, BasketError::NothingToClaim);

    position.debit_claim(amount)?;
    basket.base_reserve = basket
        .base_reserve
        .checked_sub(amount)
        .ok_or(BasketError::Underflow)?;
    basket.dividend_liability -= amount;
    basket.touch();

    Ok(ClaimReceipt {
        amount,
        basket,
        position,
    })
}

pub fn plan_deposit(basket: &Basket, admin: &Pubkey, amount: u64) -> Result<DepositReceipt> {
    basket.assert_admin(admin)?;
    basket.assert_active()?;
    require!(amount > 0, BasketError::ZeroAmount);
    require!(basket.total_shares > 0, BasketError::NoSharesOutstanding);

    let mut basket = basket.clone();
    let increment = inject(&mut basket, amount)?;
    basket.touch();

    Ok(DepositReceipt {
        amount,
        index_increment_q64: increment.raw(),
        basket,
    })
}

/// Pays out every whole base unit of dividends owed to `holder`.
pub fn claim<L: Ledger>(ledger: &L, basket_key: &Pubkey, holder: &Pubkey) -> Result<ClaimReceipt> {
    let basket = load_basket(ledger, basket_key)?;
    let position = ledger.load_position(basket_key, holder);
    let receipt = plan_claim(&basket, position.as_ref())?;

    let mut journal = Journal::new(ledger);
    journal.apply(Movement::Transfer {
        asset: basket.base_mint,
        from: *basket_key,
        to: *holder,
        amount: receipt.amount,
    })?;
    journal.commit(basket_key, &receipt.basket, Some((holder, &receipt.position)))?;

    emit!(DividendsClaimed {
        basket: *basket_key,
        holder: *holder,
        amount: receipt.amount,
        dividend_liability_after: receipt.basket.dividend_liability,
    });

    Ok(receipt)
}

/// Admin pays `amount` of base asset into custody as a pro-rata dividend.
pub fn deposit_dividends<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    admin: &Pubkey,
    amount: u64,
) -> Result<DepositReceipt> {
    let basket = load_basket(ledger, basket_key)?;
    let receipt = plan_deposit(&basket, admin, amount)?;

    let mut journal = Journal::new(ledger);
    journal.apply(Movement::Transfer {
        asset: basket.base_mint,
        from: *admin,
        to: *basket_key,
        amount,
    })?;
    journal.commit(basket_key, &receipt.basket, None)?;

    emit!(DividendsDeposited {
        basket: *basket_key,
        amount,
        acc_dividend_per_share_q64: receipt.basket.acc_dividend_per_share_q64,
    });

    Ok(receipt)
}
