//! Policy gap analysis against a reference security framework
//!
//! A local language model compares an organization's policy with a
//! reference framework; the resulting gap analysis is scored
//! deterministically and condensed into an executive summary.
//!
//! ```no_run
//! use policy_gap_analyzer::scoring::ComplianceScorer;
//!
//! let record = ComplianceScorer::default()
//!     .calculate_score("Critical: no MFA.\nLow: add logging detail.");
//! assert_eq!(record.compliance_percentage(), 83);
//! ```

pub mod app;
pub mod config;
pub mod documents;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod summary;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{AnalysisPipeline, PipelineError, PipelineState, ResultBundle};
pub use scoring::{ComplianceScorer, ScoreRecord};
pub use summary::{ExecutiveSummaryBuilder, SummaryRecord};
