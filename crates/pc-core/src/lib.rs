//! pc-core: shared foundation for the power curve workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + float helpers)
//! - bins (regular wind speed partitions)
//! - rotor (rotor geometry and available power)
//! - warnings (non-fatal domain sanity checks)
//! - error (shared error types)

pub mod bins;
pub mod error;
pub mod numeric;
pub mod rotor;
pub mod units;
pub mod warnings;

// Re-exports: nice ergonomics for downstream crates
pub use bins::{BinLimits, BinSet};
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use rotor::{AvailablePower, BETZ_LIMIT, RotorGeometry};
pub use units::*;
pub use warnings::DomainWarning;
