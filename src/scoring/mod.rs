//! Compliance scoring over free-text gap analysis
//!
//! Turns the model's prose into severity-bucketed findings, a weighted
//! compliance percentage and a risk tier. Identical text and configuration
//! always produce identical records.

pub mod extractor;
pub mod lexicon;
pub mod models;
pub mod scorer;

pub use extractor::ScoreExtractor;
pub use lexicon::{LexiconError, LexiconTier, SeverityLexicon};
pub use models::{Finding, RiskLevel, ScoreRecord, Severity, SeverityCounts};
pub use scorer::{ComplianceScorer, RiskThresholds, ScoringConfig, ScoringConfigError, ScoringWeights};
