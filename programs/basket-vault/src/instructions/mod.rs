pub mod create_basket;
pub mod set_nav;
pub mod mint_shares;
pub mod redeem_shares;
pub mod claim_dividends;
pub mod deposit_dividends;
pub mod set_pause;

pub use create_basket::*;
pub use set_nav::*;
pub use mint_shares::*;
pub use redeem_shares::*;
pub use claim_dividends::*;
pub use deposit_dividends::*;
pub use set_pause::*;
