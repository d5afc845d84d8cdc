use anchor_lang::prelude::*;

use crate::{constants::Q64_FRACTIONAL_BITS, errors::BasketError};

pub use wide::U256;

// `construct_uint!` expands to two-parameter `Result`s and must not see the
// Anchor prelude.
mod wide {
    uint::construct_uint! {
        /// 256-bit intermediate for `a * b / c` on 128-bit operands.
        pub struct U256(4);
    }
}

/// Direction applied when a quotient is not exact.
///
/// Amounts paid out of the basket round `Down`, amounts charged to a holder
/// round `Up`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// Non-negative Q64.64 fixed-point number.
///
/// The raw `u128` is the value scaled by 2^64 and is also the wire encoding:
/// NAV and the dividend index cross the program boundary as this integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Q64(u128);

impl Q64 {
    pub const ZERO: Q64 = Q64(0);
    pub const ONE: Q64 = Q64(1u128 << Q64_FRACTIONAL_BITS);

    pub const fn from_raw(raw: u128) -> Self {
        Q64(raw)
    }

    pub const fn raw(self) -> u128 {
        self.0
    }

    pub const fn from_int(value: u64) -> Self {
        Q64((value as u128) << Q64_FRACTIONAL_BITS)
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// `num / den` as a Q64.64 value.
    pub fn from_ratio(num: u64, den: u64, rounding: Rounding) -> Result<Self> {
        require!(den != 0, BasketError::InvalidParameter);
        mul_div(num as u128, Self::ONE.0, den as u128, rounding).map(Q64)
    }

    /// Converts a human-entered decimal (admin tooling only).
    ///
    /// Never use this inside the engine: NAV travels as `raw()` everywhere
    /// past the outermost input layer.
    pub fn from_f64(value: f64, rounding: Rounding) -> Result<Self> {
        require!(
            value.is_finite() && value >= 0.0,
            BasketError::InvalidParameter
        );
        let scaled = value * (Self::ONE.0 as f64);
        let scaled = match rounding {
            Rounding::Down => scaled.floor(),
            Rounding::Up => scaled.ceil(),
        };
        require!(scaled < u128::MAX as f64, BasketError::Overflow);
        Ok(Q64(scaled as u128))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::ONE.0 as f64
    }

    pub fn checked_add(self, other: Q64) -> Result<Q64> {
        self.0
            .checked_add(other.0)
            .map(Q64)
            .ok_or_else(|| error!(BasketError::Overflow))
    }

    pub fn checked_sub(self, other: Q64) -> Result<Q64> {
        self.0
            .checked_sub(other.0)
            .map(Q64)
            .ok_or_else(|| error!(BasketError::Underflow))
    }

    /// `self * n`, exact.
    pub fn mul_int(self, n: u64) -> Result<Q64> {
        self.0
            .checked_mul(n as u128)
            .map(Q64)
            .ok_or_else(|| error!(BasketError::Overflow))
    }

    /// Integer part.
    pub fn floor(self) -> u128 {
        self.0 >> Q64_FRACTIONAL_BITS
    }
}

/// `a * b / c` without intermediate overflow.
pub fn mul_div(a: u128, b: u128, c: u128, rounding: Rounding) -> Result<u128> {
    require!(c != 0, BasketError::Overflow);

    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_mod(U256::from(c));
    let quotient = match rounding {
        Rounding::Up if !remainder.is_zero() => quotient + U256::one(),
        _ => quotient,
    };

    require!(quotient <= U256::from(u128::MAX), BasketError::Overflow);
    Ok(quotient.as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_basket_error(result: Result<impl std::fmt::Debug>, expected: BasketError) {
        let expected: anchor_lang::error::Error = expected.into();
        assert_eq!(result.unwrap_err(), expected);
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 10, 3, Rounding::Down).unwrap(), 33);
        assert_eq!(mul_div(10, 10, 3, Rounding::Up).unwrap(), 34);
        // Exact quotients are identical in both directions
        assert_eq!(mul_div(10, 9, 3, Rounding::Down).unwrap(), 30);
        assert_eq!(mul_div(10, 9, 3, Rounding::Up).unwrap(), 30);
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // u128::MAX * 2^64 overflows 128 bits before the division
        let result = mul_div(u128::MAX, 1u128 << 64, 1u128 << 65, Rounding::Down).unwrap();
        assert_eq!(result, u128::MAX >> 1);

        assert_basket_error(
            mul_div(u128::MAX, 2, 1, Rounding::Down),
            BasketError::Overflow,
        );
        assert_basket_error(mul_div(1, 1, 0, Rounding::Down), BasketError::Overflow);
    }

    #[test]
    fn test_checked_sub_underflow() {
        let one = Q64::ONE;
        assert_eq!(one.checked_sub(one).unwrap(), Q64::ZERO);
        assert_basket_error(Q64::ZERO.checked_sub(one), BasketError::Underflow);
        assert_basket_error(
            Q64::from_raw(u128::MAX).checked_add(one),
            BasketError::Overflow,
        );
    }

    #[test]
    fn test_from_ratio() {
        let tenth_down = Q64::from_ratio(1, 10, Rounding::Down).unwrap();
        let tenth_up = Q64::from_ratio(1, 10, Rounding::Up).unwrap();
        assert_eq!(tenth_down.raw(), 1_844_674_407_370_955_161);
        assert_eq!(tenth_up.raw(), tenth_down.raw() + 1);
        assert_eq!(Q64::from_ratio(3, 1, Rounding::Down).unwrap(), Q64::from_int(3));
        assert_basket_error(Q64::from_ratio(1, 0, Rounding::Down), BasketError::InvalidParameter);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Q64::from_f64(1.0, Rounding::Down).unwrap(), Q64::ONE);
        assert_eq!(Q64::from_f64(2.5, Rounding::Up).unwrap().to_f64(), 2.5);
        let nav = Q64::from_f64(1.1, Rounding::Up).unwrap();
        assert!((nav.to_f64() - 1.1).abs() < 1e-12);
        assert_basket_error(Q64::from_f64(-1.0, Rounding::Down), BasketError::InvalidParameter);
        assert_basket_error(Q64::from_f64(f64::NAN, Rounding::Down), BasketError::InvalidParameter);
        assert_basket_error(Q64::from_f64(1e40, Rounding::Down), BasketError::Overflow);
    }

    #[test]
    fn test_mul_int_and_floor() {
        let half = Q64::from_ratio(1, 2, Rounding::Down).unwrap();
        assert_eq!(half.mul_int(7).unwrap().floor(), 3);
        assert_eq!(Q64::from_int(42).floor(), 42);
        assert_basket_error(Q64::from_raw(u128::MAX).mul_int(2), BasketError::Overflow);
    }
}
