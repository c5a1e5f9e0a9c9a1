//! Pending yield and experience computation.
//!
//! Pure functions of a unit's record, the tier table, the engine
//! configuration, and a query time. Nothing here mutates; the progression
//! layer applies results at claim time.
//!
//! # Accrual rules
//!
//! Experience accrues continuously:
//!
//! ```text
//! pending_xp = (now - last_claim_at) * base_xp_per_second * xp_bps / 10000
//! ```
//!
//! Yield accrues in whole fermentation periods only -- a unit must ferment
//! a full period before that period's mead is payable:
//!
//! ```text
//! effective_period = base_period * period_bps / 10000
//! periods          = (now - last_claim_at) / effective_period      (floor)
//! per_period       = rate(tier) * effective_period * prod_bps / 10000
//! pending_yield    = periods * per_period
//! ```
//!
//! The tier in `rate(tier)` is the unit's *stored* tier -- the tier it held
//! at its last claim. Experience gained during the pending window moves the
//! tier only after a claim applies it, so yield already earned at the lower
//! tier cannot be retroactively inflated within the same call.
//!
//! All arithmetic is checked integer math, multiply before divide, floor
//! rounding throughout.

use meadworks_types::{Brewery, apply_bps, scale_seconds_bps};

use crate::config::BrewingConfig;
use crate::error::EngineError;
use crate::tiers::TierTable;

/// Seconds elapsed since the unit's accrual baseline.
///
/// # Errors
///
/// Returns [`EngineError::ClockWentBackwards`] if `now` precedes the
/// baseline -- the environment promises monotone time, so a regression is
/// surfaced rather than clamped to zero.
pub fn elapsed_since_claim(unit: &Brewery, now: u64) -> Result<u64, EngineError> {
    now.checked_sub(unit.last_claim_at)
        .ok_or(EngineError::ClockWentBackwards {
            brewery: unit.id,
            now,
            last_claim_at: unit.last_claim_at,
        })
}

/// The unit's effective fermentation period in seconds.
///
/// # Errors
///
/// Returns [`EngineError::ZeroFermentationPeriod`] if the scaled period
/// floors to zero (a configuration fault that would make period counting
/// divide by zero), or [`EngineError::ArithmeticOverflow`] on overflow.
pub fn effective_fermentation_period(
    unit: &Brewery,
    config: &BrewingConfig,
) -> Result<u64, EngineError> {
    let period = scale_seconds_bps(config.base_fermentation_period, unit.fermentation_period_bps)
        .ok_or_else(|| EngineError::ArithmeticOverflow {
            context: format!("fermentation period scaling for brewery {}", unit.id),
        })?;

    if period == 0 {
        return Err(EngineError::ZeroFermentationPeriod { brewery: unit.id });
    }
    Ok(period)
}

/// Whole fermentation periods completed since the last claim.
///
/// Partial time toward the next period is not prorated here and is not
/// lost either: the claim path advances the baseline only by whole
/// periods, so the remainder stays inside the next window.
///
/// # Errors
///
/// Propagates [`elapsed_since_claim`] and
/// [`effective_fermentation_period`] errors.
pub fn completed_periods(
    unit: &Brewery,
    config: &BrewingConfig,
    now: u64,
) -> Result<u64, EngineError> {
    let elapsed = elapsed_since_claim(unit, now)?;
    let period = effective_fermentation_period(unit, config)?;
    // period >= 1 is guaranteed above.
    Ok(elapsed.checked_div(period).unwrap_or(0))
}

/// Mead payable for one completed fermentation period, in base units.
///
/// Reads the rate for the unit's *stored* tier; a table shorter than that
/// tier is surfaced as [`EngineError::TierOutOfRange`].
///
/// # Errors
///
/// Propagates tier-table and period errors; returns
/// [`EngineError::ArithmeticOverflow`] if the scaled product overflows.
pub fn per_period_yield(
    unit: &Brewery,
    tiers: &TierTable,
    config: &BrewingConfig,
) -> Result<u128, EngineError> {
    let rate = tiers.yield_per_second(unit.tier)?;
    let period = effective_fermentation_period(unit, config)?;

    let base = rate
        .checked_mul(u128::from(period))
        .ok_or_else(|| EngineError::ArithmeticOverflow {
            context: format!("per-period yield for brewery {}", unit.id),
        })?;

    apply_bps(base, unit.production_rate_bps).ok_or_else(|| EngineError::ArithmeticOverflow {
        context: format!("production multiplier for brewery {}", unit.id),
    })
}

/// Total mead pending for the unit as of `now`, in base units.
///
/// Zero whenever less than one full effective period has elapsed,
/// regardless of accumulated experience.
///
/// # Errors
///
/// Propagates the per-period and period-count errors; returns
/// [`EngineError::ArithmeticOverflow`] if the total overflows.
pub fn pending_yield(
    unit: &Brewery,
    tiers: &TierTable,
    config: &BrewingConfig,
    now: u64,
) -> Result<u128, EngineError> {
    let per_period = per_period_yield(unit, tiers, config)?;
    let periods = completed_periods(unit, config, now)?;

    per_period
        .checked_mul(u128::from(periods))
        .ok_or_else(|| EngineError::ArithmeticOverflow {
            context: format!("pending yield for brewery {}", unit.id),
        })
}

/// Experience pending for the unit as of `now`.
///
/// Continuous accrual -- no period chunking. The window is anchored at the
/// unit's claim baseline, which itself only ever advances by whole
/// periods.
///
/// # Errors
///
/// Propagates [`elapsed_since_claim`]; returns
/// [`EngineError::ArithmeticOverflow`] if the scaled product exceeds the
/// experience range.
pub fn pending_experience(
    unit: &Brewery,
    config: &BrewingConfig,
    now: u64,
) -> Result<u64, EngineError> {
    let elapsed = elapsed_since_claim(unit, now)?;

    let base = u128::from(elapsed)
        .checked_mul(u128::from(config.base_experience_per_second))
        .ok_or_else(|| EngineError::ArithmeticOverflow {
            context: format!("experience accrual for brewery {}", unit.id),
        })?;

    let scaled =
        apply_bps(base, unit.experience_rate_bps).ok_or_else(|| EngineError::ArithmeticOverflow {
            context: format!("experience multiplier for brewery {}", unit.id),
        })?;

    u64::try_from(scaled).map_err(|_err| EngineError::ArithmeticOverflow {
        context: format!("experience total for brewery {}", unit.id),
    })
}
