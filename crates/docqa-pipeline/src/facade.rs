//! The question-answering pipeline behind a single entry point.
//!
//! A facade starts `Uninitialized` and becomes `Ready` once the document has
//! been chunked and indexed. There is no way back. While `Ready` it is
//! read-only and can be shared behind an `Arc`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use docqa_answer::{get_default_completion, AnswerComposer};
use docqa_core::chunker::Chunker;
use docqa_core::config::{PipelineConfig, Settings, DEFAULT_TIMEOUT_SECS};
use docqa_core::timeout::{within, Operation};
use docqa_core::traits::{CompletionProvider, Embedder, TopicClassifier};
use docqa_core::types::{Chunk, QueryResult};
use docqa_core::{Error, Result};
use docqa_embed::get_default_embedder;
use docqa_vector::{BuildOutcome, Retriever, VectorIndex};

use crate::session::Session;
use crate::topics::KeywordClassifier;

/// Shown instead of an answer when the question could not be embedded or searched.
pub const RETRIEVAL_FAILURE_MESSAGE: &str = "Error al buscar información.";
/// Shown instead of an answer when the completion model failed.
pub const COMPLETION_FAILURE_MESSAGE: &str = "Error al generar la respuesta.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Ready,
}

pub struct PipelineFacade {
    config: PipelineConfig,
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    retriever: Retriever,
    composer: AnswerComposer,
    classifier: Arc<dyn TopicClassifier>,
    timeout: Duration,
}

impl PipelineFacade {
    pub fn new(
        config: PipelineConfig,
        embedder: Arc<dyn Embedder>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = Chunker::new(config.chunk_delimiter.clone())?;
        let index = Arc::new(VectorIndex::new());
        let retriever = Retriever::new(embedder.clone(), index.clone(), config.top_k);
        let composer = AnswerComposer::new(completion, &config);
        Ok(Self {
            config,
            chunker,
            embedder,
            index,
            retriever,
            composer,
            classifier: Arc::new(KeywordClassifier::default()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Wire the providers named by the settings (or their offline stand-ins
    /// when `APP_USE_FAKE_*` is set).
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let pipeline = &settings.pipeline;
        let embedder = get_default_embedder(&pipeline.embedding_model, &settings.provider)?;
        let completion =
            get_default_completion(&pipeline.completion_model, &settings.provider, &pipeline.refusal_sentence)?;
        Ok(Self::new(pipeline.clone(), embedder, completion)?
            .with_classifier(Arc::new(KeywordClassifier::new(&settings.topics)))
            .with_timeout(settings.provider.timeout()))
    }

    /// Deadline applied to each embedding and completion call.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            retriever: self.retriever.with_timeout(timeout),
            composer: self.composer.with_timeout(timeout),
            timeout,
            ..self
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn TopicClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn state(&self) -> PipelineState {
        if self.index.is_built() {
            PipelineState::Ready
        } else {
            PipelineState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == PipelineState::Ready
    }

    /// A fresh session whose tally lists every topic the classifier knows.
    pub fn new_session(&self) -> Session {
        Session::with_topics(self.classifier.topics())
    }

    /// Chunk and index `document`. Only the first successful call does any
    /// work; concurrent callers wait for it. On error the facade stays
    /// `Uninitialized` and the build may be retried.
    pub async fn build(&self, document: &str) -> Result<BuildOutcome> {
        if self.is_ready() {
            return Ok(BuildOutcome::AlreadyBuilt { entries: self.index.len() });
        }
        let chunks = self.chunker.chunk(document)?;
        info!(chunks = chunks.len(), model = self.embedder.model_id(), "building pipeline");
        let outcome =
            within(self.timeout, Operation::Embedding, self.index.build(&chunks, self.embedder.as_ref())).await?;
        if let BuildOutcome::Built { entries } = outcome {
            info!(entries, top_k = self.config.top_k, "pipeline ready");
        }
        Ok(outcome)
    }

    /// Answer a question from the indexed document.
    ///
    /// Provider failures come back as `Ok` with a displayable message; only
    /// `NotReady` and integrity faults are errors.
    pub async fn answer(&self, question: &str) -> Result<String> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }

        let context = match self.retriever.retrieve(question).await {
            Ok(context) => context,
            Err(e) if e.is_provider() => {
                error!(error = %e, "retrieval failed");
                return Ok(RETRIEVAL_FAILURE_MESSAGE.to_string());
            }
            Err(e) => return Err(e),
        };

        match self.composer.compose(question, &context).await {
            Ok(answer) => Ok(answer),
            Err(e) if e.is_provider() => {
                error!(error = %e, "answer generation failed");
                Ok(COMPLETION_FAILURE_MESSAGE.to_string())
            }
            Err(e) => Err(e),
        }
    }

    /// [`answer`](Self::answer), then record the turn, its topics and whether
    /// it went unanswered in `session`.
    pub async fn answer_in(&self, session: &mut Session, question: &str) -> Result<String> {
        let answer = self.answer(question).await?;
        let topics = self.classifier.classify(question);
        session.record(question, &answer, &topics, &self.config.refusal_marker);
        Ok(answer)
    }

    /// Retrieved chunks with scores, for inspecting what an answer is grounded on.
    pub async fn sources(&self, question: &str) -> Result<QueryResult> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }
        self.retriever.retrieve_scored(question).await.inspect_err(|e| warn!(error = %e, "source lookup failed"))
    }

    /// Split `document` the way `build` would, without indexing it.
    pub fn preview_chunks(&self, document: &str) -> Result<Vec<Chunk>> {
        self.chunker.chunk(document)
    }
}
