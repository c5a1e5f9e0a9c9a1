//! Ownership seam: who owns which unit, and who may act for them.
//!
//! The engine does not implement transfer or approval bookkeeping -- that
//! belongs to the surrounding token registry. It only *reads* ownership
//! through the [`OwnershipLedger`] trait when authorizing claims and
//! renovations and when enumerating an owner's units for batch
//! compounding.
//!
//! [`MemoryOwnership`] is the in-process implementation used by tests and
//! by embedders that do not bring their own registry.

use std::collections::{BTreeMap, BTreeSet};

use meadworks_types::{AccountId, BreweryId};

/// Read-only view of unit ownership.
///
/// Implementations must enumerate `units_of` in a deterministic order;
/// batch compounding reports outcomes in that order.
pub trait OwnershipLedger {
    /// The current owner of a unit, or `None` if the unit is unknown to
    /// the registry.
    fn owner_of(&self, brewery: BreweryId) -> Option<AccountId>;

    /// Whether `operator` may act on `owner`'s units.
    fn is_approved(&self, owner: AccountId, operator: AccountId) -> bool;

    /// All units held by `owner`, in deterministic enumeration order.
    fn units_of(&self, owner: AccountId) -> Vec<BreweryId>;

    /// Number of units held by `owner`.
    fn balance_of(&self, owner: AccountId) -> usize {
        self.units_of(owner).len()
    }
}

/// In-memory ownership registry.
///
/// Enumeration order is ascending unit id (the `BTreeMap` iteration
/// order), which matches mint order.
#[derive(Debug, Clone, Default)]
pub struct MemoryOwnership {
    /// Unit id to current owner.
    owners: BTreeMap<BreweryId, AccountId>,
    /// Owner to the set of operators approved for all their units.
    approvals: BTreeMap<AccountId, BTreeSet<AccountId>>,
}

impl MemoryOwnership {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            owners: BTreeMap::new(),
            approvals: BTreeMap::new(),
        }
    }

    /// Record `brewery` as held by `owner` (mint or forced assignment).
    pub fn assign(&mut self, brewery: BreweryId, owner: AccountId) {
        self.owners.insert(brewery, owner);
    }

    /// Move a unit to a new owner. Ownership changes have no accrual side
    /// effects; the engine never observes the transfer itself.
    ///
    /// Returns `false` if the unit is unknown.
    pub fn transfer(&mut self, brewery: BreweryId, to: AccountId) -> bool {
        match self.owners.get_mut(&brewery) {
            Some(owner) => {
                *owner = to;
                true
            }
            None => false,
        }
    }

    /// Approve `operator` to act on all of `owner`'s units.
    pub fn approve(&mut self, owner: AccountId, operator: AccountId) {
        self.approvals.entry(owner).or_default().insert(operator);
    }

    /// Revoke a previously granted approval.
    pub fn revoke(&mut self, owner: AccountId, operator: AccountId) {
        if let Some(set) = self.approvals.get_mut(&owner) {
            set.remove(&operator);
        }
    }
}

impl OwnershipLedger for MemoryOwnership {
    fn owner_of(&self, brewery: BreweryId) -> Option<AccountId> {
        self.owners.get(&brewery).copied()
    }

    fn is_approved(&self, owner: AccountId, operator: AccountId) -> bool {
        self.approvals
            .get(&owner)
            .is_some_and(|set| set.contains(&operator))
    }

    fn units_of(&self, owner: AccountId) -> Vec<BreweryId> {
        self.owners
            .iter()
            .filter(|(_, held_by)| **held_by == owner)
            .map(|(id, _)| *id)
            .collect()
    }
}
