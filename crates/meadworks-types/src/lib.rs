//! Shared type definitions for the Meadworks accrual engine.
//!
//! This crate is the single source of truth for the data model used across
//! the Meadworks workspace: strongly-typed identifiers, the basis-point
//! arithmetic helpers every rate computation goes through, and the
//! [`Brewery`] record itself.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers (accounts, breweries, renovations)
//! - [`bps`] -- Checked basis-point scaling with floor rounding
//! - [`brewery`] -- The [`Brewery`] record and its style category

pub mod bps;
pub mod brewery;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use bps::{ONE_HUNDRED_PERCENT_BPS, apply_bps, scale_seconds_bps};
pub use brewery::{Brewery, BreweryStyle};
pub use ids::{AccountId, BreweryId, RenovationId};
