//! Resource ledger.
//!
//! Every card that changes hands goes through [`transfer`] or [`exchange`]:
//! starting allocations, production, trades, discards, steals, monopoly,
//! year of plenty and build costs. Balances are checked before anything is
//! written, so a failed call leaves every account untouched and the total of
//! each resource across the bank and all players never changes.

use crate::board::{PlayerId, Resource};
use crate::player::ResourceHand;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Anyone who can hold resource cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    Bank,
    Player(PlayerId),
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Bank => f.write_str("bank"),
            Holder::Player(id) => write!(f, "player {}", id),
        }
    }
}

/// Why a transfer did not happen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{holder} has {available} {resource}, {requested} requested")]
    Insufficient {
        holder: Holder,
        resource: Resource,
        available: u32,
        requested: u32,
    },
    #[error("unknown holder: {0}")]
    UnknownHolder(Holder),
    #[error("cannot transfer from {0} to itself")]
    SameHolder(Holder),
}

/// Storage the ledger can move cards between
pub trait ResourceAccounts {
    fn hand(&self, holder: Holder) -> Option<&ResourceHand>;
    fn hand_mut(&mut self, holder: Holder) -> Option<&mut ResourceHand>;
}

/// Check that `holder` can pay `amounts` without touching anything
pub fn check_balance<A: ResourceAccounts + ?Sized>(
    accounts: &A,
    holder: Holder,
    amounts: &ResourceHand,
) -> Result<(), LedgerError> {
    let hand = accounts
        .hand(holder)
        .ok_or(LedgerError::UnknownHolder(holder))?;
    for (resource, requested) in amounts.entries() {
        let available = hand.get(resource);
        if available < requested {
            return Err(LedgerError::Insufficient {
                holder,
                resource,
                available,
                requested,
            });
        }
    }
    Ok(())
}

/// Atomically move `amounts` from one holder to another.
pub fn transfer<A: ResourceAccounts + ?Sized>(
    accounts: &mut A,
    from: Holder,
    to: Holder,
    amounts: &ResourceHand,
) -> Result<(), LedgerError> {
    if from == to {
        return Err(LedgerError::SameHolder(from));
    }
    if accounts.hand(to).is_none() {
        return Err(LedgerError::UnknownHolder(to));
    }
    check_balance(accounts, from, amounts)?;

    if let Some(source) = accounts.hand_mut(from) {
        for (resource, n) in amounts.entries() {
            source.set(resource, source.get(resource) - n);
        }
    }
    if let Some(dest) = accounts.hand_mut(to) {
        for (resource, n) in amounts.entries() {
            dest.add(resource, n);
        }
    }
    Ok(())
}

/// Two-leg swap: `a` gives `a_gives` to `b`, then `b` gives `b_gives` to `a`.
///
/// Either both legs happen or neither does.
pub fn exchange<A: ResourceAccounts + ?Sized>(
    accounts: &mut A,
    a: Holder,
    b: Holder,
    a_gives: &ResourceHand,
    b_gives: &ResourceHand,
) -> Result<(), LedgerError> {
    transfer(accounts, a, b, a_gives)?;
    if let Err(err) = transfer(accounts, b, a, b_gives) {
        // b has just received a_gives, so undoing leg one cannot fail
        transfer(accounts, b, a, a_gives)?;
        return Err(err);
    }
    Ok(())
}

/// Sum of one resource over every holder in `holders`
pub fn total_of<A: ResourceAccounts + ?Sized>(
    accounts: &A,
    holders: impl IntoIterator<Item = Holder>,
    resource: Resource,
) -> u32 {
    holders
        .into_iter()
        .filter_map(|h| accounts.hand(h))
        .map(|hand| hand.get(resource))
        .sum()
}
