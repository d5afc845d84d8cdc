use anchor_lang::prelude::*;

use super::{
    journal::{Journal, Movement},
    ledger::Ledger,
    load_basket, load_or_open_position,
};
use crate::{
    errors::BasketError,
    events::{SharesMinted, SharesRedeemed},
    math::{fee_on, to_base, to_shares},
    state::{Basket, Position},
};

/// Result of a mint: amounts moved plus the records as committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    pub base_in: u64,
    pub shares_out: u64,
    /// Dividends credited to the holder by the settlement that ran first
    pub dividends_settled_q64: u128,
    pub basket: Basket,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedeemReceipt {
    pub shares_in: u64,
    pub gross_out: u64,
    pub fee: u64,
    pub net_out: u64,
    pub dividends_settled_q64: u128,
    pub basket: Basket,
    pub position: Position,
}

/// Computes a mint against snapshots of the basket and position. Nothing is
/// mutated in place; the receipt carries the next revision of both.
pub fn plan_mint(
    basket: &Basket,
    position: &Position,
    base_in: u64,
    min_shares_out: u64,
) -> Result<MintReceipt> {
    basket.assert_active()?;
    require!(base_in > 0, BasketError::ZeroAmount);

    let mut basket = basket.clone();
    let mut position = position.clone();
    let settled = position.settle(basket.dividend_index())?;

    let shares_out = to_shares(basket.nav(), base_in)?;
    require!(
        shares_out >= min_shares_out,
        BasketError::SlippageExceeded
    );
    require!(shares_out > 0, BasketError::ZeroAmount);

    basket.total_shares = basket
        .total_shares
        .checked_add(shares_out)
        .ok_or(BasketError::Overflow)?;
    basket.base_reserve = basket
        .base_reserve
        .checked_add(base_in)
        .ok_or(BasketError::Overflow)?;
    position.credit_shares(shares_out)?;
    basket.touch();

    Ok(MintReceipt {
        base_in,
        shares_out,
        dividends_settled_q64: settled.raw(),
        basket,
        position,
    })
}

/// Computes a redemption. `position` is `None` when the holder never minted.
pub fn plan_redeem(
    basket: &Basket,
    position: Option<&Position>,
    shares_in: u64,
    min_base_out: u64,
) -> Result<RedeemReceipt> {
    basket.assert_active()?;
    require!(shares_in > 0, BasketError::ZeroAmount);

    let mut position = position
        .filter(|p| p.shares >= shares_in)
        .cloned()
        .ok_or(BasketError::InsufficientBalance)?;
    let mut basket = basket.clone();
    let settled = position.settle(basket.dividend_index())?;

    let gross_out = to_base(basket.nav(), shares_in)?;
    require!(gross_out > 0, BasketError::ZeroAmount);
    let fee = fee_on(gross_out, basket.fee_bps)?;
    let net_out = gross_out
        .checked_sub(fee)
        .ok_or(BasketError::Underflow)?;
    require!(net_out > 0, BasketError::ZeroAmount);
    require!(net_out >= min_base_out, BasketError::SlippageExceeded);
    require!(
        net_out <= basket.free_reserve(),
        BasketError::InsufficientReserve
    );

    basket.total_shares = basket
        .total_shares
        .checked_sub(shares_in)
        .ok_or(BasketError::Underflow)?;
    // The fee never leaves custody
    basket.base_reserve = basket
        .base_reserve
        .checked_sub(net_out)
        .ok_or(BasketError::Underflow)?;
    position.debit_shares(shares_in)?;
    basket.touch();

    Ok(RedeemReceipt {
        shares_in,
        gross_out,
        fee,
        net_out,
        dividends_settled_q64: settled.raw(),
        basket,
        position,
    })
}

/// Deposits `base_in` of the base asset and issues shares at the current NAV.
pub fn mint<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    holder: &Pubkey,
    base_in: u64,
    min_shares_out: u64,
) -> Result<MintReceipt> {
    let basket = load_basket(ledger, basket_key)?;
    let position = load_or_open_position(ledger, basket_key, &basket, holder);
    let receipt = plan_mint(&basket, &position, base_in, min_shares_out)?;

    let mut journal = Journal::new(ledger);
    journal.apply(Movement::Transfer {
        asset: basket.base_mint,
        from: *holder,
        to: *basket_key,
        amount: base_in,
    })?;
    journal.apply(Movement::MintShares {
        share_mint: basket.share_mint,
        holder: *holder,
        amount: receipt.shares_out,
    })?;
    journal.commit(basket_key, &receipt.basket, Some((holder, &receipt.position)))?;

    emit!(SharesMinted {
        basket: *basket_key,
        holder: *holder,
        base_in,
        shares_out: receipt.shares_out,
        total_shares: receipt.basket.total_shares,
        base_reserve: receipt.basket.base_reserve,
    });

    Ok(receipt)
}

/// Burns `shares_in` and pays their NAV value, less the redemption fee.
pub fn redeem<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    holder: &Pubkey,
    shares_in: u64,
    min_base_out: u64,
) -> Result<RedeemReceipt> {
    let basket = load_basket(ledger, basket_key)?;
    let position = ledger.load_position(basket_key, holder);
    let receipt = plan_redeem(&basket, position.as_ref(), shares_in, min_base_out)?;

    let mut journal = Journal::new(ledger);
    journal.apply(Movement::BurnShares {
        share_mint: basket.share_mint,
        holder: *holder,
        amount: shares_in,
    })?;
    journal.apply(Movement::Transfer {
        asset: basket.base_mint,
        from: *basket_key,
        to: *holder,
        amount: receipt.net_out,
    })?;
    journal.commit(basket_key, &receipt.basket, Some((holder, &receipt.position)))?;

    emit!(SharesRedeemed {
        basket: *basket_key,
        holder: *holder,
        shares_in,
        gross_out: receipt.gross_out,
        fee: receipt.fee,
        net_out: receipt.net_out,
        total_shares: receipt.basket.total_shares,
        base_reserve: receipt.basket.base_reserve,
    });

    Ok(receipt)
}
