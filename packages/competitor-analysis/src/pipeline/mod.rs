//! The analysis pipeline.
//!
//! - [`webpage`] - fast/full webpage extraction state machine
//! - [`reasoning`] - request building, bounded remote call, reply validation
//! - [`orchestrator`] - per-artifact operations, ledger recording, cancellation
//! - [`prompts`] - prompt templates

pub mod orchestrator;
pub mod prompts;
pub mod reasoning;
pub mod webpage;

pub use orchestrator::{
    Artifact, InvocationHandle, PdfAnalysis, Pipeline, PipelineBuilder, PipelineOutput,
    WebpageAnalysis,
};
pub use reasoning::{reply_schema, ReasoningClient, IMAGE_SCHEMA_NAME, TEXT_SCHEMA_NAME};
pub use webpage::{AnalysisRoute, FetchMode, WebpageExtraction, WebpageExtractor, WebpageState};
