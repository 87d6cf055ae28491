use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docqa_core::traits::Embedder;
use docqa_core::types::{chunk_id, Chunk, EmbeddingVector};
use docqa_core::{Error, ProviderFailure, Result};
use docqa_embed::FakeEmbedder;
use docqa_vector::{Retriever, VectorIndex};

fn chunks(texts: &[&str]) -> Vec<Chunk> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Chunk { id: chunk_id(i), index: i, text: t.to_string() })
        .collect()
}

/// Answers the build batch immediately, then hangs on single queries.
struct StallingEmbedder {
    inner: FakeEmbedder,
    stall: AtomicBool,
}

#[async_trait]
impl Embedder for StallingEmbedder {
    fn model_id(&self) -> &str {
        "stalling"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        if self.stall.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.inner.embed_batch(texts).await
    }
}

/// Records whether it was ever called.
#[derive(Default)]
struct TouchEmbedder(AtomicBool);

#[async_trait]
impl Embedder for TouchEmbedder {
    fn model_id(&self) -> &str {
        "touch"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        self.0.store(true, Ordering::SeqCst);
        Ok(texts.iter().map(|_| vec![1.0]).collect())
    }
}

#[tokio::test]
async fn retrieves_top_k_texts_most_similar_first() {
    let embedder = Arc::new(FakeEmbedder::default());
    let index = Arc::new(VectorIndex::new());
    let docs = chunks(&[
        "Javier apoya drones de vigilancia en los barrios.",
        "Empleo para jóvenes con primer trabajo.",
        "Turismo en Salento y Filandia.",
        "Créditos para el agro y los cafeteros.",
    ]);
    index.build(&docs, &*embedder).await.unwrap();

    let retriever = Retriever::new(embedder, index, 2);
    let scored = retriever.retrieve_scored("drones de vigilancia").await.unwrap();
    assert_eq!(scored.len(), 2);
    assert_eq!(scored[0].id, "doc_chunk_0");
    assert!(scored[0].score >= scored[1].score);

    let texts = retriever.retrieve("drones de vigilancia").await.unwrap();
    assert_eq!(texts[0], docs[0].text);
}

#[tokio::test]
async fn unbuilt_index_fails_without_embedding() {
    let embedder = Arc::new(TouchEmbedder::default());
    let retriever = Retriever::new(embedder.clone(), Arc::new(VectorIndex::new()), 3);

    let err = retriever.retrieve("hola").await.unwrap_err();
    assert!(matches!(err, Error::IndexNotBuilt));
    assert!(!embedder.0.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn slow_query_embedding_times_out() {
    let embedder = Arc::new(StallingEmbedder { inner: FakeEmbedder::new(16), stall: AtomicBool::new(false) });
    let index = Arc::new(VectorIndex::new());
    index.build(&chunks(&["uno", "dos"]), &*embedder).await.unwrap();
    embedder.stall.store(true, Ordering::SeqCst);

    let retriever = Retriever::new(embedder, index, 3).with_timeout(Duration::from_secs(2));
    let err = retriever.retrieve("uno").await.unwrap_err();
    assert!(matches!(err, Error::EmbeddingProvider { kind: ProviderFailure::Timeout, .. }));
}
