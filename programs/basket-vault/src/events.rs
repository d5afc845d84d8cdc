use anchor_lang::prelude::*;

#[event]
pub struct BasketCreated {
    pub basket: Pubkey,
    pub admin: Pubkey,
    pub base_mint: Pubkey,
    pub share_mint: Pubkey,
    pub base_vault: Pubkey,
    pub fee_bps: u16,
}

#[event]
pub struct NavUpdated {
    pub basket: Pubkey,
    pub old_nav_q64: u128,
    pub new_nav_q64: u128,
    pub surplus: u64,
    pub funding: u64,
    pub acc_dividend_per_share_q64: u128,
}

#[event]
pub struct SharesMinted {
    pub basket: Pubkey,
    pub holder: Pubkey,
    pub base_in: u64,
    pub shares_out: u64,
    pub total_shares: u64,
    pub base_reserve: u64,
}

#[event]
pub struct SharesRedeemed {
    pub basket: Pubkey,
    pub holder: Pubkey,
    pub shares_in: u64,
    pub gross_out: u64,
    pub fee: u64,
    pub net_out: u64,
    pub total_shares: u64,
    pub base_reserve: u64,
}

#[event]
pub struct DividendsDeposited {
    pub basket: Pubkey,
    pub amount: u64,
    pub acc_dividend_per_share_q64: u128,
}

#[event]
pub struct DividendsClaimed {
    pub basket: Pubkey,
    pub holder: Pubkey,
    pub amount: u64,
    pub dividend_liability_after: u64,
}

#[event]
pub struct PauseUpdated {
    pub basket: Pubkey,
    pub paused: bool,
}
