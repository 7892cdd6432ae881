//! Pod lifecycle timeline reconstruction
//!
//! This crate provides the core functionality for:
//! - Modeling instants, intervals and their locators
//! - Reconstructing intervals from sparse, unordered lifecycle instants
//! - Canonical ordering and JSON persistence of interval documents
//! - Exclusion filtering of known-noisy locators
//! - Metrics and structured logging

pub mod error;
pub mod exclusions;
pub mod models;
pub mod observability;
pub mod ordering;
pub mod reconstruct;
pub mod serialization;

pub use error::{TimelineError, TimelineResult};
pub use exclusions::ExclusionFilter;
pub use models::*;
pub use observability::{StructuredLogger, TimelineMetrics};
pub use reconstruct::{reconstruct, reconstruct_in, summarize, ReconstructionSummary, Window};
