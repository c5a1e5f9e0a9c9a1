//! Error types for the `meadworks-engine` crate.
//!
//! Every error is surfaced to the caller synchronously and aborts the
//! current operation's effects entirely; no partial mutation survives a
//! failed call. The one deliberate exception is batch compounding, which
//! catches per-unit errors so sibling units proceed. Nothing is retried
//! by the engine itself.

use meadworks_types::{AccountId, BreweryId, RenovationId};

use crate::payout::SinkError;

/// Errors that can occur during engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A tier was appended with a threshold that does not strictly exceed
    /// the previous tier's threshold.
    #[error("tier threshold {attempted} does not exceed previous threshold {last}")]
    TierOrdering {
        /// The highest threshold already in the table.
        last: u64,
        /// The rejected threshold.
        attempted: u64,
    },

    /// A unit's recorded tier points past the end of the tier table -- a
    /// consistency fault between table and unit state, typically caused by
    /// reconfiguring the table beneath live units.
    #[error("tier {tier} out of range (table has {len} tiers)")]
    TierOutOfRange {
        /// The unit's recorded tier index.
        tier: u32,
        /// The current table length.
        len: usize,
    },

    /// Neither yield nor experience is pending. A benign no-op rejection,
    /// not a fault.
    #[error("brewery {brewery} has nothing to claim")]
    NothingToClaim {
        /// The unit with nothing pending.
        brewery: BreweryId,
    },

    /// A renovation was presented a second time.
    #[error("renovation {renovation} has already been applied")]
    RenovationAlreadyApplied {
        /// The replayed renovation.
        renovation: RenovationId,
    },

    /// A renovation was presented against a unit it does not target.
    /// The renovation is not consumed by this rejection.
    #[error("renovation {renovation} targets brewery {expected}, not {actual}")]
    RenovationTargetMismatch {
        /// The misdirected renovation.
        renovation: RenovationId,
        /// The unit the renovation was created for.
        expected: BreweryId,
        /// The unit it was presented against.
        actual: BreweryId,
    },

    /// No renovation with this id exists.
    #[error("renovation not found: {0}")]
    UnknownRenovation(RenovationId),

    /// The tax schedule produced a rate above 100%, which would invert the
    /// sign of net yield.
    #[error("tax rate {rate_bps} bps exceeds 100%")]
    InvalidTaxRate {
        /// The offending rate in basis points.
        rate_bps: u64,
    },

    /// The downstream mead transfer was rejected.
    #[error("payout failed: {source}")]
    PayoutFailed {
        /// The underlying sink rejection.
        #[from]
        source: SinkError,
    },

    /// The caller is neither the owner nor an approved operator.
    #[error("account {caller} is not authorized for brewery {brewery}")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
        /// The unit the caller tried to act on.
        brewery: BreweryId,
    },

    /// No brewery with this id exists.
    #[error("brewery not found: {0}")]
    UnknownBrewery(BreweryId),

    /// The effective fermentation period scaled down to zero seconds,
    /// which would make period counting divide by zero.
    #[error("effective fermentation period for brewery {brewery} is zero")]
    ZeroFermentationPeriod {
        /// The misconfigured unit.
        brewery: BreweryId,
    },

    /// The query time precedes the unit's accrual baseline. The
    /// environment promises monotone time, so this is a fault, not
    /// something to clamp.
    #[error("time {now} precedes claim baseline {last_claim_at} for brewery {brewery}")]
    ClockWentBackwards {
        /// The unit being queried.
        brewery: BreweryId,
        /// The offending query time.
        now: u64,
        /// The unit's accrual baseline.
        last_claim_at: u64,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in accrual calculation: {context}")]
    ArithmeticOverflow {
        /// Where the overflow happened.
        context: String,
    },
}

impl EngineError {
    /// Returns `true` for the benign no-op rejection.
    ///
    /// Batch compounding treats this variant as an expected per-unit
    /// outcome; everything else in the enum is a genuine fault.
    pub const fn is_nothing_to_claim(&self) -> bool {
        matches!(self, Self::NothingToClaim { .. })
    }
}
