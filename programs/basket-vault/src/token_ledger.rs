use std::cell::RefCell;

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::{
    constants::BASKET_SEED,
    engine::{Ledger, LedgerError, LedgerResult},
    state::{Basket, Position},
};

/// A token account passed to the instruction, with the fields the ledger
/// routes on.
#[derive(Clone)]
pub struct TokenAccountRef<'info> {
    pub info: AccountInfo<'info>,
    pub mint: Pubkey,
    pub owner: Pubkey,
}

impl<'info> TokenAccountRef<'info> {
    pub fn new(account: &Account<'info, TokenAccount>) -> Self {
        Self {
            info: account.to_account_info(),
            mint: account.mint,
            owner: account.owner,
        }
    }
}

/// The signer on the other side of the basket: a holder or the admin.
struct Party<'info> {
    authority: AccountInfo<'info>,
    base_account: Option<TokenAccountRef<'info>>,
    share_account: Option<TokenAccountRef<'info>>,
}

/// [`Ledger`] over SPL-token CPIs and the instruction's Anchor accounts.
///
/// The basket PDA owns the custody vault and is the share mint authority,
/// so payouts and share mints are signed with its seeds. Movements out of a
/// holder or the admin are authorised by that party's signature. Records are
/// held in memory and written back to their accounts by the instruction
/// handler via [`TokenLedger::into_records`].
pub struct TokenLedger<'info> {
    token_program: AccountInfo<'info>,
    basket_info: AccountInfo<'info>,
    share_mint_key: Pubkey,
    bump: u8,
    base_mint: Option<Pubkey>,
    base_vault: Option<TokenAccountRef<'info>>,
    share_mint: Option<AccountInfo<'info>>,
    party: Option<Party<'info>>,
    basket: RefCell<Option<Basket>>,
    position: RefCell<Option<(Pubkey, Position)>>,
}

impl<'info> TokenLedger<'info> {
    pub fn new(
        token_program: &Program<'info, Token>,
        basket_info: AccountInfo<'info>,
        share_mint: Pubkey,
        bump: u8,
    ) -> Self {
        Self {
            token_program: token_program.to_account_info(),
            basket_info,
            share_mint_key: share_mint,
            bump,
            base_mint: None,
            base_vault: None,
            share_mint: None,
            party: None,
            basket: RefCell::new(None),
            position: RefCell::new(None),
        }
    }

    /// Ledger for an existing basket account.
    pub fn for_basket(token_program: &Program<'info, Token>, basket: &Account<'info, Basket>) -> Self {
        let mut ledger = Self::new(
            token_program,
            basket.to_account_info(),
            basket.share_mint,
            basket.bump,
        );
        ledger.base_mint = Some(basket.base_mint);
        *ledger.basket.get_mut() = Some((**basket).clone());
        ledger
    }

    pub fn with_vault(mut self, vault: &Account<'info, TokenAccount>) -> Self {
        self.base_mint = Some(vault.mint);
        self.base_vault = Some(TokenAccountRef::new(vault));
        self
    }

    pub fn with_share_mint(mut self, share_mint: &Account<'info, Mint>) -> Self {
        self.share_mint = Some(share_mint.to_account_info());
        self
    }

    pub fn with_party(
        mut self,
        authority: &Signer<'info>,
        base_account: Option<&Account<'info, TokenAccount>>,
        share_account: Option<&Account<'info, TokenAccount>>,
    ) -> Self {
        self.party = Some(Party {
            authority: authority.to_account_info(),
            base_account: base_account.map(TokenAccountRef::new),
            share_account: share_account.map(TokenAccountRef::new),
        });
        self
    }

    /// Attaches the holder's position. Accounts created by `init_if_needed`
    /// are still zeroed and count as absent.
    pub fn with_position(mut self, holder: Pubkey, position: &Account<'info, Position>) -> Self {
        if position.is_open() {
            *self.position.get_mut() = Some((holder, (**position).clone()));
        }
        self
    }

    pub fn into_records(self) -> (Option<Basket>, Option<Position>) {
        (
            self.basket.into_inner(),
            self.position.into_inner().map(|(_, position)| position),
        )
    }

    fn basket_key(&self) -> Pubkey {
        self.basket_info.key()
    }

    fn vault(&self) -> LedgerResult<&TokenAccountRef<'info>> {
        self.base_vault
            .as_ref()
            .ok_or_else(|| LedgerError::UnknownAccount(self.basket_key()))
    }

    fn party(&self, key: &Pubkey) -> LedgerResult<&Party<'info>> {
        self.party
            .as_ref()
            .filter(|party| party.authority.key == key)
            .ok_or(LedgerError::UnknownAccount(*key))
    }

    fn share_mint(&self, share_mint: &Pubkey) -> LedgerResult<&AccountInfo<'info>> {
        if *share_mint != self.share_mint_key {
            return Err(LedgerError::UnknownAsset(*share_mint));
        }
        self.share_mint
            .as_ref()
            .ok_or(LedgerError::UnknownAsset(*share_mint))
    }

    fn share_account<'p>(party: &'p Party<'info>) -> LedgerResult<&'p TokenAccountRef<'info>> {
        party
            .share_account
            .as_ref()
            .ok_or(LedgerError::UnknownAccount(party.authority.key()))
    }

    fn base_account<'p>(party: &'p Party<'info>) -> LedgerResult<&'p TokenAccountRef<'info>> {
        party
            .base_account
            .as_ref()
            .ok_or(LedgerError::UnknownAccount(party.authority.key()))
    }
}

impl<'info> Ledger for TokenLedger<'info> {
    /// The vault is created by the instruction's account constraints; this
    /// checks it belongs to `authority` and holds `asset`.
    fn open_custody(&self, asset: &Pubkey, authority: &Pubkey) -> LedgerResult<Pubkey> {
        let vault = self.vault()?;
        if vault.mint != *asset {
            return Err(LedgerError::UnknownAsset(*asset));
        }
        if vault.owner != *authority {
            return Err(LedgerError::UnknownAccount(vault.info.key()));
        }
        Ok(vault.info.key())
    }

    // The vault is created by the instruction's accounts and disappears with
    // the failed transaction.
    fn close_custody(&self, _asset: &Pubkey, _authority: &Pubkey) -> LedgerResult<()> {
        Ok(())
    }

    fn transfer(&self, asset: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u64) -> LedgerResult<()> {
        if self.base_mint != Some(*asset) {
            return Err(LedgerError::UnknownAsset(*asset));
        }
        let vault = self.vault()?;
        let basket_key = self.basket_key();

        if *from == basket_key {
            let party = self.party(to)?;
            let destination = Self::base_account(party)?;
            let bump = [self.bump];
            let seeds: &[&[u8]] = &[BASKET_SEED, self.share_mint_key.as_ref(), &bump];
            token::transfer(
                CpiContext::new_with_signer(
                    self.token_program.clone(),
                    Transfer {
                        from: vault.info.clone(),
                        to: destination.info.clone(),
                        authority: self.basket_info.clone(),
                    },
                    &[seeds],
                ),
                amount,
            )?;
        } else if *to == basket_key {
            let party = self.party(from)?;
            let source = Self::base_account(party)?;
            token::transfer(
                CpiContext::new(
                    self.token_program.clone(),
                    Transfer {
                        from: source.info.clone(),
                        to: vault.info.clone(),
                        authority: party.authority.clone(),
                    },
                ),
                amount,
            )?;
        } else {
            return Err(LedgerError::UnknownAccount(*from));
        }
        Ok(())
    }

    fn mint_share_token(&self, share_mint: &Pubkey, holder: &Pubkey, amount: u64) -> LedgerResult<()> {
        let mint = self.share_mint(share_mint)?;
        let destination = Self::share_account(self.party(holder)?)?;
        let bump = [self.bump];
        let seeds: &[&[u8]] = &[BASKET_SEED, self.share_mint_key.as_ref(), &bump];
        token::mint_to(
            CpiContext::new_with_signer(
                self.token_program.clone(),
                MintTo {
                    mint: mint.clone(),
                    to: destination.info.clone(),
                    authority: self.basket_info.clone(),
                },
                &[seeds],
            ),
            amount,
        )?;
        Ok(())
    }

    fn burn_share_token(&self, share_mint: &Pubkey, holder: &Pubkey, amount: u64) -> LedgerResult<()> {
        let mint = self.share_mint(share_mint)?;
        let party = self.party(holder)?;
        let source = Self::share_account(party)?;
        token::burn(
            CpiContext::new(
                self.token_program.clone(),
                Burn {
                    mint: mint.clone(),
                    from: source.info.clone(),
                    authority: party.authority.clone(),
                },
            ),
            amount,
        )?;
        Ok(())
    }

    fn load_basket(&self, key: &Pubkey) -> Option<Basket> {
        if *key != self.basket_key() {
            return None;
        }
        self.basket.borrow().clone()
    }

    fn store_basket(&self, key: &Pubkey, basket: &Basket) -> LedgerResult<()> {
        if *key != self.basket_key() {
            return Err(LedgerError::UnknownAccount(*key));
        }
        *self.basket.borrow_mut() = Some(basket.clone());
        Ok(())
    }

    fn load_position(&self, basket: &Pubkey, holder: &Pubkey) -> Option<Position> {
        if *basket != self.basket_key() {
            return None;
        }
        self.position
            .borrow()
            .as_ref()
            .filter(|(owner, _)| owner == holder)
            .map(|(_, position)| position.clone())
    }

    fn store_position(&self, basket: &Pubkey, holder: &Pubkey, position: &Position) -> LedgerResult<()> {
        if *basket != self.basket_key() {
            return Err(LedgerError::UnknownAccount(*basket));
        }
        *self.position.borrow_mut() = Some((*holder, position.clone()));
        Ok(())
    }
}
