//! Renovations: consume-once upgrade tokens.
//!
//! A renovation is created by an authorized party against a specific unit,
//! consumed exactly once, and never replayed. The lifecycle is a two-state
//! tag, `Created -> Applied`; only a successful application transitions it.
//! Rejections (wrong target, unknown unit) leave the renovation `Created`
//! so it can still be applied where it belongs.
//!
//! What a renovation does to its unit is carried explicitly in
//! [`RenovationWork`]: an optional new style and optional replacements for
//! each multiplier. Whether a given renovation grants the rare
//! [`BreweryStyle::Magical`] outcome is its creator's policy -- the
//! gateway applies whatever the record carries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use meadworks_types::{Brewery, BreweryId, BreweryStyle, RenovationId};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Renovation record
// ---------------------------------------------------------------------------

/// Lifecycle tag for a renovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenovationStatus {
    /// Created and not yet consumed.
    Created,
    /// Consumed by a successful application; terminal.
    Applied,
}

/// The mutation a renovation performs on its target unit.
///
/// Every field is optional; a renovation that sets none of them is legal
/// and simply consumes itself without changing the unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenovationWork {
    /// Replace the unit's style.
    pub style: Option<BreweryStyle>,
    /// Replace the production rate multiplier, in basis points.
    pub production_rate_bps: Option<u64>,
    /// Replace the fermentation period multiplier, in basis points.
    pub fermentation_period_bps: Option<u64>,
    /// Replace the experience gain multiplier, in basis points.
    pub experience_rate_bps: Option<u64>,
    /// Rename the unit.
    pub name: Option<String>,
}

/// A one-shot upgrade request targeting a specific unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renovation {
    /// Unique renovation identifier.
    pub id: RenovationId,
    /// The unit this renovation was created for.
    pub target: BreweryId,
    /// Lifecycle state.
    pub status: RenovationStatus,
    /// The mutation to perform.
    pub work: RenovationWork,
}

/// Apply a renovation to a unit record.
///
/// This is the single-use invariant in isolation, independent of any
/// registry: the renovation must be `Created` and must target the unit.
/// On success the unit is mutated per the work payload and the renovation
/// transitions to `Applied`. On failure neither side changes.
///
/// # Errors
///
/// Returns [`EngineError::RenovationAlreadyApplied`] on replay, or
/// [`EngineError::RenovationTargetMismatch`] if presented against the
/// wrong unit (without consuming the renovation).
pub fn apply(unit: &mut Brewery, renovation: &mut Renovation) -> Result<(), EngineError> {
    if renovation.target != unit.id {
        return Err(EngineError::RenovationTargetMismatch {
            renovation: renovation.id,
            expected: renovation.target,
            actual: unit.id,
        });
    }
    if renovation.status != RenovationStatus::Created {
        return Err(EngineError::RenovationAlreadyApplied {
            renovation: renovation.id,
        });
    }

    let work = &renovation.work;
    if let Some(style) = work.style {
        unit.style = style;
    }
    if let Some(bps) = work.production_rate_bps {
        unit.production_rate_bps = bps;
    }
    if let Some(bps) = work.fermentation_period_bps {
        unit.fermentation_period_bps = bps;
    }
    if let Some(bps) = work.experience_rate_bps {
        unit.experience_rate_bps = bps;
    }
    if let Some(name) = &work.name {
        unit.name.clone_from(name);
    }

    renovation.status = RenovationStatus::Applied;
    Ok(())
}

// ---------------------------------------------------------------------------
// RenovationBook
// ---------------------------------------------------------------------------

/// Registry of renovations, keyed by id.
///
/// The book stands in for the external renovation producer: an authorized
/// party creates records here and the progression layer consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenovationBook {
    renovations: BTreeMap<RenovationId, Renovation>,
    next_id: u64,
}

impl RenovationBook {
    /// Create an empty book.
    pub const fn new() -> Self {
        Self {
            renovations: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a renovation targeting `target` and return its id.
    pub fn create(&mut self, target: BreweryId, work: RenovationWork) -> RenovationId {
        let id = RenovationId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.renovations.insert(
            id,
            Renovation {
                id,
                target,
                status: RenovationStatus::Created,
                work,
            },
        );
        id
    }

    /// Look up a renovation.
    pub fn get(&self, id: RenovationId) -> Option<&Renovation> {
        self.renovations.get(&id)
    }

    /// Mutable lookup, used by the progression layer during application.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownRenovation`] if no record exists.
    pub fn get_mut(&mut self, id: RenovationId) -> Result<&mut Renovation, EngineError> {
        self.renovations
            .get_mut(&id)
            .ok_or(EngineError::UnknownRenovation(id))
    }

    /// Number of renovations ever created.
    pub fn len(&self) -> usize {
        self.renovations.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.renovations.is_empty()
    }
}

impl Default for RenovationBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: u64) -> Brewery {
        Brewery::minted(BreweryId::new(id), String::from("Cask"), 0)
    }

    fn magic_work() -> RenovationWork {
        RenovationWork {
            style: Some(BreweryStyle::Magical),
            production_rate_bps: Some(20_000),
            fermentation_period_bps: Some(8_000),
            experience_rate_bps: Some(15_000),
            name: None,
        }
    }

    #[test]
    fn apply_mutates_unit_and_consumes() {
        let mut u = unit(1);
        let mut book = RenovationBook::new();
        let id = book.create(u.id, magic_work());

        let renovation = book.get_mut(id);
        assert!(renovation.is_ok());
        if let Ok(r) = renovation {
            assert!(apply(&mut u, r).is_ok());
            assert_eq!(r.status, RenovationStatus::Applied);
        }

        assert_eq!(u.style, BreweryStyle::Magical);
        assert_eq!(u.production_rate_bps, 20_000);
        assert_eq!(u.fermentation_period_bps, 8_000);
        assert_eq!(u.experience_rate_bps, 15_000);
    }

    #[test]
    fn replay_is_rejected_and_unit_unchanged() {
        let mut u = unit(1);
        let mut r = Renovation {
            id: RenovationId::new(1),
            target: u.id,
            status: RenovationStatus::Created,
            work: magic_work(),
        };

        assert!(apply(&mut u, &mut r).is_ok());
        let after_first = u.clone();

        let second = apply(&mut u, &mut r);
        assert!(matches!(
            second,
            Err(EngineError::RenovationAlreadyApplied { .. })
        ));
        // Multipliers after the failed replay equal those after the
        // successful application.
        assert_eq!(u, after_first);
    }

    #[test]
    fn wrong_target_is_rejected_without_consuming() {
        let mut wrong = unit(2);
        let mut r = Renovation {
            id: RenovationId::new(1),
            target: BreweryId::new(1),
            status: RenovationStatus::Created,
            work: magic_work(),
        };

        let result = apply(&mut wrong, &mut r);
        assert!(matches!(
            result,
            Err(EngineError::RenovationTargetMismatch { .. })
        ));
        // Still consumable by the right unit.
        assert_eq!(r.status, RenovationStatus::Created);
        let mut right = unit(1);
        assert!(apply(&mut right, &mut r).is_ok());
    }

    #[test]
    fn empty_work_consumes_without_mutation() {
        let mut u = unit(1);
        let before = u.clone();
        let mut r = Renovation {
            id: RenovationId::new(1),
            target: u.id,
            status: RenovationStatus::Created,
            work: RenovationWork::default(),
        };
        assert!(apply(&mut u, &mut r).is_ok());
        assert_eq!(u, before);
        assert_eq!(r.status, RenovationStatus::Applied);
    }

    #[test]
    fn rename_work_renames() {
        let mut u = unit(1);
        let mut r = Renovation {
            id: RenovationId::new(1),
            target: u.id,
            status: RenovationStatus::Created,
            work: RenovationWork {
                name: Some(String::from("Golden Vat")),
                ..RenovationWork::default()
            },
        };
        assert!(apply(&mut u, &mut r).is_ok());
        assert_eq!(u.name, "Golden Vat");
    }

    #[test]
    fn book_assigns_sequential_ids() {
        let mut book = RenovationBook::new();
        let first = book.create(BreweryId::new(1), RenovationWork::default());
        let second = book.create(BreweryId::new(2), RenovationWork::default());
        assert!(first < second);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn unknown_renovation_lookup_fails() {
        let mut book = RenovationBook::new();
        let result = book.get_mut(RenovationId::new(99));
        assert!(matches!(result, Err(EngineError::UnknownRenovation(_))));
    }
}
