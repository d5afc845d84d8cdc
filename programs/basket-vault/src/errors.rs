use anchor_lang::prelude::*;

#[error_code]
pub enum BasketError {
    #[msg("Signer is not the basket admin")]
    Unauthorized,

    #[msg("Invalid parameter: fee must be below 10000 bps and NAV must be positive")]
    InvalidParameter,

    #[msg("Basket already exists for this share mint")]
    AlreadyExists,

    #[msg("Amount converts to zero shares or zero base units")]
    ZeroAmount,

    #[msg("Not enough shares held in this position")]
    InsufficientBalance,

    #[msg("Result is below the caller's minimum")]
    SlippageExceeded,

    #[msg("No dividends to claim")]
    NothingToClaim,

    #[msg("Math overflow")]
    Overflow,

    #[msg("Math underflow")]
    Underflow,

    #[msg("Ledger adapter rejected an asset movement or record write")]
    LedgerError,

    #[msg("Basket not initialized")]
    BasketNotFound,

    #[msg("Basket is paused")]
    Paused,

    #[msg("Reserve not covering the payout after dividend liabilities")]
    InsufficientReserve,

    #[msg("No shares outstanding to distribute to")]
    NoSharesOutstanding,
}
