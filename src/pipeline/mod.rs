//! Analysis pipeline state machine
//!
//! Stages run strictly forward:
//! `Empty → DocumentsLoaded → GapAnalysisDone → Scored → RemediationDone`.
//! Export is available from `Scored` onwards.

pub mod bundle;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use bundle::ResultBundle;
pub use error::{DocumentRole, PipelineError};
pub use orchestrator::AnalysisPipeline;
pub use state::{Operation, PipelineState};
