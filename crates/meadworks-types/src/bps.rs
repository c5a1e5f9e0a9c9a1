//! Checked basis-point scaling.
//!
//! Every multiplier in the engine -- production rate, fermentation period,
//! experience gain, claim tax -- is a basis-point factor applied to an
//! integer base value. The scaling rule is uniform: multiply before
//! dividing, divide by [`ONE_HUNDRED_PERCENT_BPS`], truncate toward zero.
//! No floating point anywhere; overflow is reported, never wrapped.

/// The basis-point denominator: 10 000 bps == 100%.
pub const ONE_HUNDRED_PERCENT_BPS: u64 = 10_000;

/// Scale an amount by a basis-point factor, flooring the result.
///
/// `apply_bps(v, 10_000)` is the identity; `apply_bps(v, 5_000)` halves;
/// `apply_bps(v, 15_000)` adds fifty percent. The intermediate product is
/// computed in full before the division so no precision is lost.
///
/// Returns `None` if the intermediate multiplication overflows `u128`.
pub fn apply_bps(value: u128, bps: u64) -> Option<u128> {
    value
        .checked_mul(u128::from(bps))?
        .checked_div(u128::from(ONE_HUNDRED_PERCENT_BPS))
}

/// Scale a duration in seconds by a basis-point factor, flooring the result.
///
/// The computation widens to `u128` so the intermediate product cannot
/// overflow for any `u64` input; `None` is only possible if the floored
/// result no longer fits in `u64`, which requires `bps > 10_000`.
pub fn scale_seconds_bps(seconds: u64, bps: u64) -> Option<u64> {
    let scaled = apply_bps(u128::from(seconds), bps)?;
    u64::try_from(scaled).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_hundred_percent_is_identity() {
        assert_eq!(apply_bps(12_345, ONE_HUNDRED_PERCENT_BPS), Some(12_345));
    }

    #[test]
    fn half_rate_floors() {
        // 7 * 5000 / 10000 = 3.5 -> 3
        assert_eq!(apply_bps(7, 5_000), Some(3));
    }

    #[test]
    fn boost_above_one_hundred_percent() {
        // 200 * 15000 / 10000 = 300
        assert_eq!(apply_bps(200, 15_000), Some(300));
    }

    #[test]
    fn zero_bps_zeroes_the_value() {
        assert_eq!(apply_bps(1_000_000, 0), Some(0));
    }

    #[test]
    fn sub_unit_result_floors_to_zero() {
        // 1 * 9999 / 10000 = 0.9999 -> 0
        assert_eq!(apply_bps(1, 9_999), Some(0));
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(apply_bps(u128::MAX, 2), None);
    }

    #[test]
    fn seconds_scaling_floors() {
        // 86400 * 9000 / 10000 = 77760
        assert_eq!(scale_seconds_bps(86_400, 9_000), Some(77_760));
    }

    #[test]
    fn seconds_scaling_widens_through_u128() {
        // u64::MAX at 100% survives the round-trip.
        assert_eq!(
            scale_seconds_bps(u64::MAX, ONE_HUNDRED_PERCENT_BPS),
            Some(u64::MAX)
        );
        // But a 200% boost of u64::MAX no longer fits.
        assert_eq!(scale_seconds_bps(u64::MAX, 20_000), None);
    }
}
