//! Claim tax from the external reputation system.
//!
//! An owner's tax rate is a function of their reputation class, which is
//! owned by an external collaborator and read through the
//! [`ReputationSource`] trait. The engine maps class to rate through a
//! configured [`TaxSchedule`]; the curve itself is configuration, not
//! engine logic. By convention the schedule is monotone -- a better class
//! pays no more than a worse one -- but that is asserted in tests, not
//! enforced at runtime.
//!
//! Tax is a claim-time effect only. Display views report pre-tax figures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use meadworks_types::{AccountId, ONE_HUNDRED_PERCENT_BPS, apply_bps};

use crate::error::EngineError;

/// Read-only view of the external reputation store.
pub trait ReputationSource {
    /// The reputation class of an account. Class 0 is the zero-reputation
    /// baseline; higher classes indicate better standing.
    fn class_of(&self, account: AccountId) -> u32;

    /// The raw reputation score of an account.
    fn score_of(&self, account: AccountId) -> u64;
}

/// In-memory reputation store for tests and standalone embedding.
///
/// Unknown accounts read as class 0 with a zero score.
#[derive(Debug, Clone, Default)]
pub struct MemoryReputation {
    classes: BTreeMap<AccountId, u32>,
    scores: BTreeMap<AccountId, u64>,
}

impl MemoryReputation {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            scores: BTreeMap::new(),
        }
    }

    /// Record an account's class.
    pub fn set_class(&mut self, account: AccountId, class: u32) {
        self.classes.insert(account, class);
    }

    /// Record an account's score.
    pub fn set_score(&mut self, account: AccountId, score: u64) {
        self.scores.insert(account, score);
    }
}

impl ReputationSource for MemoryReputation {
    fn class_of(&self, account: AccountId) -> u32 {
        self.classes.get(&account).copied().unwrap_or(0)
    }

    fn score_of(&self, account: AccountId) -> u64 {
        self.scores.get(&account).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// TaxSchedule
// ---------------------------------------------------------------------------

/// The result of assessing tax on a gross claim amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxAssessment {
    /// The rate that was applied, in basis points.
    pub rate_bps: u64,
    /// The portion withheld for the treasury (floored).
    pub withheld: u128,
    /// The portion paid to the owner.
    pub net: u128,
}

/// Class-indexed claim tax rates in basis points.
///
/// Index is the reputation class ordinal. A class beyond the configured
/// range falls back to the last entry (the schedule's coarsest class);
/// an empty schedule taxes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    /// Rate per class, ascending class order.
    class_rates: Vec<u64>,
}

impl TaxSchedule {
    /// Build a schedule from per-class rates.
    ///
    /// Rates are validated at assessment time, not here, so a schedule
    /// loaded from configuration surfaces its fault on first use rather
    /// than at startup.
    pub const fn new(class_rates: Vec<u64>) -> Self {
        Self { class_rates }
    }

    /// The rate for a reputation class.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidTaxRate`] if the configured rate
    /// exceeds 100% -- a rate above that would invert the sign of net
    /// yield, so it is rejected defensively.
    pub fn rate_for(&self, class: u32) -> Result<u64, EngineError> {
        let rate = self
            .class_rates
            .get(class as usize)
            .or_else(|| self.class_rates.last())
            .copied()
            .unwrap_or(0);

        if rate > ONE_HUNDRED_PERCENT_BPS {
            return Err(EngineError::InvalidTaxRate { rate_bps: rate });
        }
        Ok(rate)
    }

    /// Split a gross amount into withheld and net portions for a class.
    ///
    /// The withheld portion floors; the owner receives the remainder, so
    /// no base unit is ever lost to rounding.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::rate_for`]; returns
    /// [`EngineError::ArithmeticOverflow`] if the scaling overflows.
    pub fn assess(&self, gross: u128, class: u32) -> Result<TaxAssessment, EngineError> {
        let rate_bps = self.rate_for(class)?;

        let withheld =
            apply_bps(gross, rate_bps).ok_or_else(|| EngineError::ArithmeticOverflow {
                context: String::from("tax withholding"),
            })?;

        let net = gross
            .checked_sub(withheld)
            .ok_or_else(|| EngineError::ArithmeticOverflow {
                context: String::from("net after tax"),
            })?;

        Ok(TaxAssessment {
            rate_bps,
            withheld,
            net,
        })
    }
}

impl Default for TaxSchedule {
    /// The production curve: zero-reputation owners pay 30%, each class
    /// improvement lowers the rate, the best class pays nothing.
    fn default() -> Self {
        Self::new(vec![3_000, 2_000, 1_000, 0])
    }
}
