//! docqa-pipeline
//!
//! Ties chunking, indexing, retrieval and answer composition together behind
//! [`PipelineFacade`], plus the caller-owned [`Session`] bookkeeping.

pub mod facade;
pub mod session;
pub mod topics;

pub use facade::{PipelineFacade, PipelineState, COMPLETION_FAILURE_MESSAGE, RETRIEVAL_FAILURE_MESSAGE};
pub use session::Session;
pub use topics::KeywordClassifier;
