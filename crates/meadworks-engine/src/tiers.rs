//! The tier table: ordered experience thresholds and their yield rates.
//!
//! A single table is shared by every unit in the process. Tiers are
//! appended in strictly increasing threshold order by an authorized
//! configurator; index 0 is the base tier every unit starts at.
//!
//! # Operational precondition
//!
//! [`TierTable::clear`] exists for reconfiguration windows only. Clearing
//! or shortening the table while live units still record tiers beyond its
//! new length is not prevented here -- the fault surfaces later as
//! [`EngineError::TierOutOfRange`] when such a unit's yield rate is read.
//! That surfacing is deliberate: a table shorter than a live unit's tier
//! is a consistency fault, not something to clamp over.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One progression level: the experience required to hold it and the
/// yield rate it confers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Minimum accumulated experience for a unit to sit at this tier.
    pub xp_threshold: u64,
    /// Mead produced per second at this tier, in base units, before
    /// per-unit multipliers.
    pub yield_per_second: u128,
}

/// Ordered registry of tiers, shared process-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    /// Tiers in ascending threshold order.
    tiers: Vec<Tier>,
}

impl TierTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier.
    ///
    /// Returns the new tier's index. The first appended tier is
    /// conventionally `{0, base rate}` so that freshly minted units sit
    /// on a configured tier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TierOrdering`] if `xp_threshold` is not
    /// strictly greater than the last tier's threshold.
    pub fn add_tier(
        &mut self,
        xp_threshold: u64,
        yield_per_second: u128,
    ) -> Result<u32, EngineError> {
        if let Some(last) = self.tiers.last() {
            if xp_threshold <= last.xp_threshold {
                return Err(EngineError::TierOrdering {
                    last: last.xp_threshold,
                    attempted: xp_threshold,
                });
            }
        }

        self.tiers.push(Tier {
            xp_threshold,
            yield_per_second,
        });

        // The freshly pushed index always fits: a table long enough to
        // overflow u32 could not have been built through this method.
        let index = self.tiers.len().saturating_sub(1);
        Ok(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Empty the table.
    ///
    /// Used only during reconfiguration windows; see the module-level
    /// precondition.
    pub fn clear(&mut self) {
        self.tiers.clear();
    }

    /// The highest tier index whose threshold is at or below `experience`.
    ///
    /// Binary search over the ordered thresholds. An empty table, or a
    /// table whose first threshold lies above `experience`, answers 0
    /// (the degenerate fallback -- every unit has *some* tier).
    pub fn tier_for_experience(&self, experience: u64) -> u32 {
        let reached = self
            .tiers
            .partition_point(|tier| tier.xp_threshold <= experience);
        let index = reached.saturating_sub(1);
        u32::try_from(index).unwrap_or(u32::MAX)
    }

    /// The configured yield rate for a tier index.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TierOutOfRange`] if the table is shorter
    /// than the requested tier -- the consistency fault described at
    /// module level.
    pub fn yield_per_second(&self, tier: u32) -> Result<u128, EngineError> {
        self.tiers
            .get(tier as usize)
            .map(|t| t.yield_per_second)
            .ok_or(EngineError::TierOutOfRange {
                tier,
                len: self.tiers.len(),
            })
    }

    /// Look up a tier by index.
    pub fn get(&self, tier: u32) -> Option<&Tier> {
        self.tiers.get(tier as usize)
    }

    /// Number of configured tiers.
    pub const fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Whether the table has no tiers.
    pub const fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Iterate the tiers in threshold order.
    pub fn iter(&self) -> core::slice::Iter<'_, Tier> {
        self.tiers.iter()
    }
}

impl<'a> IntoIterator for &'a TierTable {
    type Item = &'a Tier;
    type IntoIter = core::slice::Iter<'a, Tier>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The production-style three-tier table used across the test suite.
    fn standard_table() -> TierTable {
        let mut table = TierTable::new();
        assert_eq!(table.add_tier(0, 2).ok(), Some(0));
        assert_eq!(table.add_tier(50, 3).ok(), Some(1));
        assert_eq!(table.add_tier(100, 4).ok(), Some(2));
        table
    }

    #[test]
    fn append_returns_ascending_indices() {
        let table = standard_table();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn equal_threshold_is_rejected() {
        let mut table = standard_table();
        let result = table.add_tier(100, 5);
        assert!(matches!(
            result,
            Err(EngineError::TierOrdering {
                last: 100,
                attempted: 100
            })
        ));
        // Rejection leaves the table untouched.
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn lower_threshold_is_rejected() {
        let mut table = standard_table();
        let result = table.add_tier(75, 5);
        assert!(matches!(result, Err(EngineError::TierOrdering { .. })));
    }

    #[test]
    fn lookup_below_first_boundary() {
        let table = standard_table();
        assert_eq!(table.tier_for_experience(0), 0);
        assert_eq!(table.tier_for_experience(49), 0);
    }

    #[test]
    fn lookup_exactly_on_boundary() {
        let table = standard_table();
        // "Highest index whose threshold <= xp": 50 belongs to tier 1.
        assert_eq!(table.tier_for_experience(50), 1);
        assert_eq!(table.tier_for_experience(100), 2);
    }

    #[test]
    fn lookup_between_and_beyond_boundaries() {
        let table = standard_table();
        assert_eq!(table.tier_for_experience(51), 1);
        assert_eq!(table.tier_for_experience(99), 1);
        assert_eq!(table.tier_for_experience(u64::MAX), 2);
    }

    #[test]
    fn empty_table_answers_tier_zero() {
        let table = TierTable::new();
        assert_eq!(table.tier_for_experience(0), 0);
        assert_eq!(table.tier_for_experience(1_000), 0);
    }

    #[test]
    fn degenerate_first_threshold_above_xp() {
        let mut table = TierTable::new();
        assert!(table.add_tier(10, 7).is_ok());
        // Below the first threshold there is still a tier: index 0.
        assert_eq!(table.tier_for_experience(5), 0);
    }

    #[test]
    fn yield_rate_for_configured_tier() {
        let table = standard_table();
        assert_eq!(table.yield_per_second(0).ok(), Some(2));
        assert_eq!(table.yield_per_second(2).ok(), Some(4));
    }

    #[test]
    fn yield_rate_past_table_end_is_a_fault() {
        let table = standard_table();
        let result = table.yield_per_second(3);
        assert!(matches!(
            result,
            Err(EngineError::TierOutOfRange { tier: 3, len: 3 })
        ));
    }

    #[test]
    fn clear_then_read_surfaces_the_shrink_fault() {
        let mut table = standard_table();
        table.clear();
        assert!(table.is_empty());
        // A unit still recording tier 0 now reads past the table.
        let result = table.yield_per_second(0);
        assert!(matches!(
            result,
            Err(EngineError::TierOutOfRange { tier: 0, len: 0 })
        ));
    }
}
