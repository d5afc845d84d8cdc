/// PDA seeds
pub const BASKET_SEED: &[u8] = b"basket";
/// Position PDA: [POSITION_SEED, basket, holder]
pub const POSITION_SEED: &[u8] = b"position";

/// Fee constants
pub const MAX_BPS: u16 = 10000;

/// Q64.64 scale
pub const Q64_FRACTIONAL_BITS: u32 = 64;
/// NAV of a freshly created basket: one share per base unit.
pub const INITIAL_NAV_Q64: u128 = 1u128 << Q64_FRACTIONAL_BITS;
