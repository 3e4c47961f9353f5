//! Executive summaries derived from compliance scores
//!
//! Narrative, priority list and phased timeline are all picked from fixed
//! templates and mappings, never generated, so the same analysis always
//! produces the same summary.

pub mod builder;
pub mod models;

pub use builder::{assessment_for, ExecutiveSummaryBuilder, SummaryConfig};
pub use models::{Horizon, KeyMetrics, SummaryRecord, TimelineEntry};
