//! The [`Brewery`] record: per-unit mutable state.
//!
//! One record exists per minted unit. The record holds everything the
//! accrual math reads -- tier, experience, the claim baseline, and the
//! three basis-point multipliers -- plus the display name and style
//! category. Ownership is deliberately *not* stored here; it lives in the
//! external ownership ledger and is only ever read through that seam.

use serde::{Deserialize, Serialize};

use crate::bps::ONE_HUNDRED_PERCENT_BPS;
use crate::ids::BreweryId;

// ---------------------------------------------------------------------------
// BreweryStyle
// ---------------------------------------------------------------------------

/// The style category of a brewery unit.
///
/// Style is cosmetic for the accrual math itself -- it selects metadata and
/// records which renovation line a unit has taken. [`BreweryStyle::Magical`]
/// is the distinguished rare outcome; renovations that grant it
/// conventionally carry materially higher multipliers, but that pairing is
/// the renovation creator's policy, not something this type enforces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum BreweryStyle {
    /// The ordinary starting style every unit is minted with.
    #[default]
    Classic,
    /// Coastal renovation line.
    Coastal,
    /// Alpine renovation line.
    Alpine,
    /// The rare upgrade outcome.
    Magical,
}

impl BreweryStyle {
    /// Returns `true` for the distinguished rare style.
    pub const fn is_magical(self) -> bool {
        matches!(self, Self::Magical)
    }
}

// ---------------------------------------------------------------------------
// Brewery
// ---------------------------------------------------------------------------

/// Per-unit mutable state for one minted brewery.
///
/// # Invariants
///
/// - `last_claim_at <= now` for every timestamp the engine is queried with.
/// - Immediately after any claim, `tier` equals the tier table's answer for
///   `experience`; between claims the stored tier may lag behind pending
///   experience (the projected tier view exists for that).
/// - `experience` and `total_yield_claimed` never decrease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brewery {
    /// Unique unit identifier, assigned at mint.
    pub id: BreweryId,
    /// Display name chosen at mint; renamable via renovation.
    pub name: String,
    /// Style category; mutable via renovation only.
    pub style: BreweryStyle,
    /// Index into the tier table. Monotonically non-decreasing.
    pub tier: u32,
    /// Accumulated experience.
    pub experience: u64,
    /// Accrual baseline in unix seconds. Advances only by whole
    /// fermentation periods at claim time, never jumps to "now".
    pub last_claim_at: u64,
    /// Lifetime mead credited to the owner, net of claim tax. Monotone.
    pub total_yield_claimed: u128,
    /// Production rate multiplier in basis points (10 000 = 100%).
    pub production_rate_bps: u64,
    /// Fermentation period multiplier in basis points (10 000 = 100%).
    pub fermentation_period_bps: u64,
    /// Experience gain multiplier in basis points (10 000 = 100%).
    pub experience_rate_bps: u64,
}

impl Brewery {
    /// Create the record for a freshly minted unit.
    ///
    /// New units start at tier 0 with zero experience, all multipliers at
    /// 100%, and the accrual baseline set to the mint time.
    pub const fn minted(id: BreweryId, name: String, minted_at: u64) -> Self {
        Self {
            id,
            name,
            style: BreweryStyle::Classic,
            tier: 0,
            experience: 0,
            last_claim_at: minted_at,
            total_yield_claimed: 0,
            production_rate_bps: ONE_HUNDRED_PERCENT_BPS,
            fermentation_period_bps: ONE_HUNDRED_PERCENT_BPS,
            experience_rate_bps: ONE_HUNDRED_PERCENT_BPS,
        }
    }
}
