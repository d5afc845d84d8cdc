use anchor_lang::prelude::*;

use crate::{
    constants::MAX_BPS,
    errors::BasketError,
    math::fixed_point::{mul_div, Q64, Rounding},
};

/// Shares issued for `base_amount` at `nav`, rounded down.
pub fn to_shares(nav: Q64, base_amount: u64) -> Result<u64> {
    require!(!nav.is_zero(), BasketError::InvalidParameter);
    let shares = mul_div(base_amount as u128, Q64::ONE.raw(), nav.raw(), Rounding::Down)?;
    u64::try_from(shares).map_err(|_| error!(BasketError::Overflow))
}

/// Base units owed for `shares` at `nav`, rounded down.
pub fn to_base(nav: Q64, shares: u64) -> Result<u64> {
    let base = mul_div(shares as u128, nav.raw(), Q64::ONE.raw(), Rounding::Down)?;
    u64::try_from(base).map_err(|_| error!(BasketError::Overflow))
}

/// Redemption fee on `amount`, rounded up.
pub fn fee_on(amount: u64, fee_bps: u16) -> Result<u64> {
    let fee = mul_div(amount as u128, fee_bps as u128, MAX_BPS as u128, Rounding::Up)?;
    u64::try_from(fee).map_err(|_| error!(BasketError::Overflow))
}

/// `amount / total_shares` as a per-share Q64.64 increment.
pub fn per_share(amount: u64, total_shares: u64, rounding: Rounding) -> Result<Q64> {
    require!(total_shares > 0, BasketError::NoSharesOutstanding);
    mul_div(amount as u128, Q64::ONE.raw(), total_shares as u128, rounding).map(Q64::from_raw)
}
