//! Payout seam: the downstream mead transfer.
//!
//! Claim settlement pays net yield to the owner and the withheld tax to
//! the treasury through the [`MeadSink`] trait. Transfers are checked,
//! never fire-and-forget: a sink rejection surfaces as
//! [`EngineError::PayoutFailed`] and the claim aborts with no unit
//! mutation.
//!
//! [`MemorySink`] accumulates balances in-process and can be armed to
//! reject transfers, which is how the payout-atomicity tests drive the
//! failure path.
//!
//! [`EngineError::PayoutFailed`]: crate::error::EngineError::PayoutFailed

use std::collections::BTreeMap;

use meadworks_types::AccountId;

/// A rejected mead transfer.
#[derive(Debug, thiserror::Error)]
#[error("mead transfer of {amount} to {to} rejected: {reason}")]
pub struct SinkError {
    /// The intended recipient.
    pub to: AccountId,
    /// The amount that was not delivered, in base units.
    pub amount: u128,
    /// The sink's stated reason.
    pub reason: String,
}

/// Destination for settled mead.
pub trait MeadSink {
    /// Deliver `amount` base units to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the transfer is rejected. Implementations
    /// must either deliver fully or reject fully -- no partial delivery.
    fn transfer(&mut self, to: AccountId, amount: u128) -> Result<(), SinkError>;
}

/// In-memory sink keeping a balance per account.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    balances: BTreeMap<AccountId, u128>,
    failing: bool,
}

impl MemorySink {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
            failing: false,
        }
    }

    /// The balance delivered to `account` so far.
    pub fn balance_of(&self, account: AccountId) -> u128 {
        self.balances.get(&account).copied().unwrap_or(0)
    }

    /// Arm or disarm transfer rejection. While armed, every transfer is
    /// rejected and no balance moves.
    pub const fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl MeadSink for MemorySink {
    fn transfer(&mut self, to: AccountId, amount: u128) -> Result<(), SinkError> {
        if self.failing {
            return Err(SinkError {
                to,
                amount,
                reason: String::from("sink armed to fail"),
            });
        }

        let entry = self.balances.entry(to).or_insert(0);
        *entry = entry.checked_add(amount).ok_or_else(|| SinkError {
            to,
            amount,
            reason: String::from("recipient balance overflow"),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfers_accumulate() {
        let mut sink = MemorySink::new();
        let alice = AccountId::new();
        assert!(sink.transfer(alice, 70).is_ok());
        assert!(sink.transfer(alice, 30).is_ok());
        assert_eq!(sink.balance_of(alice), 100);
    }

    #[test]
    fn zero_transfer_is_accepted() {
        let mut sink = MemorySink::new();
        let alice = AccountId::new();
        assert!(sink.transfer(alice, 0).is_ok());
        assert_eq!(sink.balance_of(alice), 0);
    }

    #[test]
    fn armed_sink_rejects_without_moving_balance() {
        let mut sink = MemorySink::new();
        let alice = AccountId::new();
        sink.set_failing(true);
        let result = sink.transfer(alice, 10);
        assert!(result.is_err());
        assert_eq!(sink.balance_of(alice), 0);

        sink.set_failing(false);
        assert!(sink.transfer(alice, 10).is_ok());
        assert_eq!(sink.balance_of(alice), 10);
    }

    #[test]
    fn overflow_rejects_fully() {
        let mut sink = MemorySink::new();
        let alice = AccountId::new();
        assert!(sink.transfer(alice, u128::MAX).is_ok());
        let result = sink.transfer(alice, 1);
        assert!(result.is_err());
        assert_eq!(sink.balance_of(alice), u128::MAX);
    }
}
