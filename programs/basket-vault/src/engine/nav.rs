use anchor_lang::prelude::*;

use super::{
    dividends::credit_index,
    journal::{Journal, Movement},
    ledger::Ledger,
    load_basket,
};
use crate::{
    errors::BasketError,
    events::NavUpdated,
    math::{to_base, Q64},
    state::Basket,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavReceipt {
    pub old_nav_q64: u128,
    pub new_nav_q64: u128,
    /// Value implied by the new NAV beyond the reserve already backing the
    /// shares, credited as dividends
    pub surplus: u64,
    /// Base units the admin paid into custody to back the new NAV and the
    /// dividends it created
    pub funding: u64,
    pub index_increment_q64: u128,
    pub basket: Basket,
}

/// Prices the NAV change.
///
/// The baseline is the part of the reserve not owed as dividends. Whatever
/// the new NAV implies for the outstanding shares beyond that baseline is
/// yield: it is credited to holders through the dividend index before the
/// new NAV takes effect. A recovery after a drop, or a rise already covered
/// by retained fees, is not yield. The admin then tops the reserve up until
/// it covers the shares at the new NAV plus every unclaimed dividend.
pub fn plan_nav_update(basket: &Basket, admin: &Pubkey, new_nav: Q64) -> Result<NavReceipt> {
    basket.assert_admin(admin)?;
    basket.assert_active()?;
    require!(!new_nav.is_zero(), BasketError::InvalidParameter);

    let old_nav = basket.nav();
    let baseline = basket.base_reserve.saturating_sub(basket.dividend_liability);
    let after = to_base(new_nav, basket.total_shares)?;
    let surplus = after.saturating_sub(baseline);

    let mut basket = basket.clone();
    let increment = credit_index(&mut basket, surplus)?;
    let required = after
        .checked_add(basket.dividend_liability)
        .ok_or(BasketError::Overflow)?;
    let funding = required.saturating_sub(basket.base_reserve);
    basket.base_reserve += funding;
    basket.nav_q64 = new_nav.raw();
    basket.touch();

    Ok(NavReceipt {
        old_nav_q64: old_nav.raw(),
        new_nav_q64: new_nav.raw(),
        surplus,
        funding,
        index_increment_q64: increment.raw(),
        basket,
    })
}

/// Admin/oracle NAV update. `nav_q64` is the raw Q64.64 encoding.
pub fn set_nav<L: Ledger>(
    ledger: &L,
    basket_key: &Pubkey,
    admin: &Pubkey,
    nav_q64: u128,
) -> Result<NavReceipt> {
    let basket = load_basket(ledger, basket_key)?;
    let receipt = plan_nav_update(&basket, admin, Q64::from_raw(nav_q64))?;

    let mut journal = Journal::new(ledger);
    journal.apply(Movement::Transfer {
        asset: basket.base_mint,
        from: *admin,
        to: *basket_key,
        amount: receipt.funding,
    })?;
    journal.commit(basket_key, &receipt.basket, None)?;

    emit!(NavUpdated {
        basket: *basket_key,
        old_nav_q64: receipt.old_nav_q64,
        new_nav_q64: receipt.new_nav_q64,
        surplus: receipt.surplus,
        funding: receipt.funding,
        acc_dividend_per_share_q64: receipt.basket.acc_dividend_per_share_q64,
    });

    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rounding;

    fn basket_with(total_shares: u64) -> Basket {
        let mut basket = Basket::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            0,
            0,
        )
        .unwrap();
        basket.total_shares = total_shares;
        basket.base_reserve = total_shares;
        basket
    }

    fn error(kind: BasketError) -> anchor_lang::error::Error {
        kind.into()
    }

    #[test]
    fn test_nav_rise_becomes_dividend() {
        let basket = basket_with(1_000_000);
        let nav = Q64::from_ratio(11, 10, Rounding::Up).unwrap();

        let receipt = plan_nav_update(&basket, &basket.admin, nav).unwrap();
        assert_eq!(receipt.surplus, 100_000);
        // 1_100_000 to back the shares plus 100_000 owed as dividends
        assert_eq!(receipt.funding, 200_000);
        assert_eq!(receipt.basket.nav(), nav);
        assert_eq!(receipt.basket.base_reserve, 1_200_000);
        assert_eq!(receipt.basket.dividend_liability, 100_000);
        assert_eq!(
            receipt.basket.dividend_index().mul_int(1_000_000).unwrap().floor(),
            100_000
        );
    }

    #[test]
    fn test_nav_drop_has_no_surplus() {
        let basket = basket_with(1_000_000);
        let nav = Q64::from_ratio(9, 10, Rounding::Down).unwrap();

        let receipt = plan_nav_update(&basket, &basket.admin, nav).unwrap();
        assert_eq!(receipt.surplus, 0);
        assert_eq!(receipt.funding, 0);
        assert!(receipt.basket.dividend_index().is_zero());
        assert_eq!(receipt.basket.base_reserve, 1_000_000);
    }

    #[test]
    fn test_retained_fees_back_a_rise_first() {
        let mut basket = basket_with(1_000_000);
        // Redemption fees left 50_000 in custody beyond the shares' value
        basket.base_reserve = 1_050_000;
        let nav = Q64::from_ratio(11, 10, Rounding::Up).unwrap();

        let receipt = plan_nav_update(&basket, &basket.admin, nav).unwrap();
        assert_eq!(receipt.surplus, 50_000);
        assert_eq!(receipt.funding, 100_000);
        assert_eq!(receipt.basket.dividend_liability, 50_000);
        assert_eq!(receipt.basket.base_reserve, 1_150_000);
    }

    #[test]
    fn test_rise_covered_by_custody_is_not_yield() {
        let mut basket = basket_with(1_000_000);
        basket.base_reserve = 1_500_000;
        let nav = Q64::from_ratio(3, 2, Rounding::Down).unwrap();

        let receipt = plan_nav_update(&basket, &basket.admin, nav).unwrap();
        assert_eq!(receipt.surplus, 0);
        assert_eq!(receipt.funding, 0);
        assert!(receipt.basket.dividend_index().is_zero());
        assert_eq!(receipt.basket.base_reserve, 1_500_000);
    }

    #[test]
    fn test_recovery_after_drop_is_not_yield() {
        let basket = basket_with(1_000_000);
        let admin = basket.admin;
        let half = Q64::from_ratio(1, 2, Rounding::Down).unwrap();

        let dropped = plan_nav_update(&basket, &admin, half).unwrap();
        let recovered = plan_nav_update(&dropped.basket, &admin, Q64::ONE).unwrap();
        assert_eq!(recovered.surplus, 0);
        assert_eq!(recovered.funding, 0);
        assert_eq!(recovered.basket.dividend_liability, 0);
        assert_eq!(recovered.basket.base_reserve, 1_000_000);
    }

    #[test]
    fn test_unclaimed_dividends_stay_out_of_baseline() {
        let mut basket = basket_with(1_000_000);
        // 10_000 of earlier dividends still sit in custody, owed to holders
        basket.base_reserve = 1_010_000;
        basket.dividend_liability = 10_000;
        let nav = Q64::from_ratio(11, 10, Rounding::Up).unwrap();

        let receipt = plan_nav_update(&basket, &basket.admin, nav).unwrap();
        assert_eq!(receipt.surplus, 100_000);
        assert_eq!(receipt.basket.dividend_liability, 110_000);
        assert_eq!(receipt.funding, 200_000);
    }

    #[test]
    fn test_empty_basket_takes_new_nav() {
        let basket = basket_with(0);
        let receipt = plan_nav_update(&basket, &basket.admin, Q64::from_int(2)).unwrap();
        assert_eq!(receipt.surplus, 0);
        assert_eq!(receipt.basket.nav(), Q64::from_int(2));
    }

    #[test]
    fn test_nav_update_guards() {
        let mut basket = basket_with(10);
        let admin = basket.admin;

        assert_eq!(
            plan_nav_update(&basket, &Pubkey::new_unique(), Q64::ONE).unwrap_err(),
            error(BasketError::Unauthorized)
        );
        assert_eq!(
            plan_nav_update(&basket, &admin, Q64::ZERO).unwrap_err(),
            error(BasketError::InvalidParameter)
        );

        basket.paused = true;
        assert_eq!(
            plan_nav_update(&basket, &admin, Q64::ONE).unwrap_err(),
            error(BasketError::Paused)
        );
    }
}
