//! Vulnerability registry.
//!
//! In-memory model of the risk and desire lists a call works on, with the
//! append/diff/count operations used by the flow controller and the outcome
//! report.
//!
//! # Module Structure
//!
//! - `model`: `VulnerabilityItem`, `VulnerabilityKind`, `SeverityScores`
//! - `ops`: `add`, `diff`, `count_by_category`

mod model;
mod ops;

pub use model::{SeverityScores, VulnerabilityItem, VulnerabilityKind};
pub use ops::{add, count_by_category, diff};
