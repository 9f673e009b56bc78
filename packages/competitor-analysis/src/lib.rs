//! Competitor Artifact Analysis Pipeline
//!
//! Turns competitor material (free text, an image, a PDF, or a live web page)
//! into a canonical [`ExtractedContent`], sends it to a structured-analysis
//! service and keeps a bounded trail of recent invocations.
//!
//! # Usage
//!
//! ```rust,ignore
//! use competitor_analysis::{FetchMode, Pipeline};
//! use competitor_analysis::testing::MockReasoningService;
//!
//! let pipeline = Pipeline::builder(Arc::new(MockReasoningService::new())).build()?;
//!
//! let analysis = pipeline
//!     .analyze_text("Great prices, slow delivery, no live chat support.")
//!     .await?;
//!
//! let page = pipeline.analyze_url("https://example.com", FetchMode::Fast).await?;
//!
//! for entry in pipeline.history() {
//!     println!("{} {}", entry.kind(), entry.request_summary());
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams to external collaborators (reasoning service, fetcher, renderer)
//! - [`types`] - Content, analysis results, history entries, configuration
//! - [`extractors`] - Text, image, PDF and markup extraction
//! - [`pipeline`] - Webpage state machine, reasoning client, orchestrator
//! - [`stores`] - The history ledger
//! - [`security`] - URL guard
//! - [`report`] - Markdown report
//! - [`testing`] - Mock implementations for testing
//!
//! # Features
//!
//! - `openai` - [`ai::OpenAiReasoner`], backed by `openai-client`
//! - `browser` - [`extractors::ChromeRenderer`], backed by headless Chrome

pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod report;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    AnalysisError, AnalysisOutcome, ExtractionError, ExtractionResult, PipelineError,
    PipelineResult, ValidationError,
};
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    reasoning::{ReasoningRequest, ReasoningService},
    renderer::{NoRenderer, PageRenderer, RenderedPage},
};
pub use types::{
    analysis::{AnalysisResult, Assessment, ImageAnalysis, Score, TextAnalysis, MAX_SCORE},
    config::PipelineConfig,
    content::{EncodedImage, ExtractedContent, PageOutline, SourceKind},
    history::HistoryEntry,
};

// Re-export pipeline components
pub use pipeline::{
    AnalysisRoute, Artifact, FetchMode, InvocationHandle, PdfAnalysis, Pipeline, PipelineBuilder,
    PipelineOutput, ReasoningClient, WebpageAnalysis, WebpageState,
};

pub use extractors::{HttpFetcher, PdfExtractor};
pub use report::render_markdown;
pub use security::UrlGuard;
pub use stores::HistoryLedger;

#[cfg(feature = "browser")]
pub use extractors::ChromeRenderer;

#[cfg(feature = "openai")]
pub use ai::OpenAiReasoner;
