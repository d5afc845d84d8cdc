use anchor_lang::prelude::*;

use super::ledger::{ledger_failure, Ledger, LedgerResult};
use crate::state::{Basket, Position};

/// One asset movement issued to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Transfer {
        asset: Pubkey,
        from: Pubkey,
        to: Pubkey,
        amount: u64,
    },
    MintShares {
        share_mint: Pubkey,
        holder: Pubkey,
        amount: u64,
    },
    BurnShares {
        share_mint: Pubkey,
        holder: Pubkey,
        amount: u64,
    },
}

impl Movement {
    fn inverse(self) -> Movement {
        match self {
            Movement::Transfer { asset, from, to, amount } => Movement::Transfer {
                asset,
                from: to,
                to: from,
                amount,
            },
            Movement::MintShares { share_mint, holder, amount } => Movement::BurnShares {
                share_mint,
                holder,
                amount,
            },
            Movement::BurnShares { share_mint, holder, amount } => Movement::MintShares {
                share_mint,
                holder,
                amount,
            },
        }
    }

    fn apply<L: Ledger>(self, ledger: &L) -> LedgerResult<()> {
        match self {
            Movement::Transfer { asset, from, to, amount } => {
                ledger.transfer(&asset, &from, &to, amount)
            }
            Movement::MintShares { share_mint, holder, amount } => {
                ledger.mint_share_token(&share_mint, &holder, amount)
            }
            Movement::BurnShares { share_mint, holder, amount } => {
                ledger.burn_share_token(&share_mint, &holder, amount)
            }
        }
    }
}

/// Applies the movements of one operation in order and commits the records
/// last. Any failure reverts the movements already applied, newest first, so
/// a failed call leaves neither balances nor records changed.
pub struct Journal<'a, L: Ledger> {
    ledger: &'a L,
    applied: Vec<Movement>,
}

impl<'a, L: Ledger> Journal<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            applied: Vec::new(),
        }
    }

    /// Zero-amount movements are skipped.
    pub fn apply(&mut self, movement: Movement) -> Result<()> {
        if movement_amount(&movement) == 0 {
            return Ok(());
        }
        match movement.apply(self.ledger) {
            Ok(()) => {
                self.applied.push(movement);
                Ok(())
            }
            Err(err) => {
                self.rollback();
                Err(ledger_failure(err))
            }
        }
    }

    pub fn commit(
        mut self,
        key: &Pubkey,
        basket: &Basket,
        position: Option<(&Pubkey, &Position)>,
    ) -> Result<()> {
        match self.ledger.commit(key, basket, position) {
            Ok(()) => {
                self.applied.clear();
                Ok(())
            }
            Err(err) => {
                self.rollback();
                Err(ledger_failure(err))
            }
        }
    }

    fn rollback(&mut self) {
        while let Some(movement) = self.applied.pop() {
            if let Err(err) = movement.inverse().apply(self.ledger) {
                msg!("rollback of {:?} failed: {}", movement, err);
            }
        }
    }
}

fn movement_amount(movement: &Movement) -> u64 {
    match *movement {
        Movement::Transfer { amount, .. }
        | Movement::MintShares { amount, .. }
        | Movement::BurnShares { amount, .. } => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryLedger;

    #[test]
    fn test_failed_movement_reverts_earlier_ones() {
        let ledger = MemoryLedger::default();
        let asset = Pubkey::new_unique();
        let share_mint = Pubkey::new_unique();
        let holder = Pubkey::new_unique();
        let custody = Pubkey::new_unique();
        ledger.fund(&asset, &holder, 500);
        ledger.freeze_share_mint(&share_mint);

        let mut journal = Journal::new(&ledger);
        journal
            .apply(Movement::Transfer {
                asset,
                from: holder,
                to: custody,
                amount: 200,
            })
            .unwrap();
        assert_eq!(ledger.balance(&asset, &custody), 200);

        let result = journal.apply(Movement::MintShares {
            share_mint,
            holder,
            amount: 200,
        });
        assert!(result.is_err());
        assert_eq!(ledger.balance(&asset, &holder), 500);
        assert_eq!(ledger.balance(&asset, &custody), 0);
    }

    #[test]
    fn test_inverse_pairs() {
        let share_mint = Pubkey::new_unique();
        let holder = Pubkey::new_unique();
        let mint = Movement::MintShares {
            share_mint,
            holder,
            amount: 9,
        };
        assert_eq!(
            mint.inverse(),
            Movement::BurnShares {
                share_mint,
                holder,
                amount: 9
            }
        );
        assert_eq!(mint.inverse().inverse(), mint);
    }
}
