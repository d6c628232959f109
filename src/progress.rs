//! Progress-callback trait for per-stage pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::QuizConfigBuilder::progress_callback`] to be told when
//! each stage starts and finishes. The CLI uses it to drive a spinner; a GUI
//! shell could forward the events anywhere else.
//!
//! # Example
//!
//! ```rust
//! use quizgen::{PipelineProgressCallback, PipelineStage, QuizConfig};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineProgressCallback for Printer {
//!     fn on_stage_start(&self, stage: PipelineStage) {
//!         eprintln!("→ {}", stage);
//!     }
//! }
//!
//! let config = QuizConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// Steps of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    ReadDocument,
    Generate,
    Parse,
    Review,
    Format,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::ReadDocument => "Reading document",
            PipelineStage::Generate => "Generating quiz",
            PipelineStage::Parse => "Parsing quiz",
            PipelineStage::Review => "Reviewing quiz",
            PipelineStage::Format => "Formatting results",
        };
        f.write_str(label)
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// All methods default to no-ops so implementors override only what they
/// need. A run is sequential, so calls never overlap.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before a stage begins.
    fn on_stage_start(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    ///
    /// # Arguments
    /// * `stage`: the stage that finished
    /// * `elapsed_ms`: wall-clock time spent in the stage
    fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails; the run stops afterwards.
    fn on_stage_error(&self, stage: PipelineStage, error: &str) {
        let _ = (stage, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::QuizConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
