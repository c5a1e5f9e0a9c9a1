//! Tier-progressive accrual and progression engine for brewery units.
//!
//! Each minted unit ferments mead in whole periods, accrues experience
//! continuously, and advances through a shared tier table as experience
//! crosses thresholds. Claims settle both at once: yield is taxed by the
//! owner's reputation class, paid through the mead sink, and the unit's
//! baseline advances by exactly the periods consumed. Renovations are
//! consume-once upgrade tokens that rewrite a unit's style and
//! multipliers.
//!
//! The engine performs no I/O and reads no clocks: every operation takes
//! the current time from its caller, which keeps the math bit-exact and
//! replayable from a call log.
//!
//! # Modules
//!
//! - [`accrual`] -- Pure pending-yield and pending-experience math
//! - [`config`] -- Process-wide scalars ([`BrewingConfig`]) and YAML loading
//! - [`error`] -- Error types for all engine operations ([`EngineError`])
//! - [`metadata`] -- Base URI and per-(style, tier) suffix table
//! - [`ownership`] -- Ownership seam ([`OwnershipLedger`]) and in-memory registry
//! - [`payout`] -- Mead transfer seam ([`MeadSink`]) and in-memory sink
//! - [`progression`] -- The [`Brewhouse`]: claim, compound, mint, reconfiguration
//! - [`renovation`] -- Consume-once upgrade tokens and their registry
//! - [`tax`] -- Reputation-class tax schedule and the reputation seam
//! - [`tiers`] -- The shared [`TierTable`]

pub mod accrual;
pub mod config;
pub mod error;
pub mod metadata;
pub mod ownership;
pub mod payout;
pub mod progression;
pub mod renovation;
pub mod tax;
pub mod tiers;

// Re-export primary types at crate root for convenience.
pub use config::{BrewingConfig, ConfigError};
pub use error::EngineError;
pub use metadata::MetadataTable;
pub use ownership::{MemoryOwnership, OwnershipLedger};
pub use payout::{MeadSink, MemorySink, SinkError};
pub use progression::{Brewhouse, ClaimContext, ClaimReceipt, CompoundSummary};
pub use renovation::{Renovation, RenovationBook, RenovationStatus, RenovationWork};
pub use tax::{MemoryReputation, ReputationSource, TaxAssessment, TaxSchedule};
pub use tiers::{Tier, TierTable};
