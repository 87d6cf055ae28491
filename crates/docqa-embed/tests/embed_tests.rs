use docqa_core::config::ProviderConfig;
use docqa_core::traits::Embedder;
use docqa_embed::{get_default_embedder, FakeEmbedder, FAKE_EMBEDDING_DIM};

#[tokio::test]
async fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid any network call
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder("ignored", &ProviderConfig::default()).expect("embedder");
    let texts = vec!["hola mundo".to_string(), "hola mundo".to_string()];
    let embs = embedder.embed_batch(&texts).await.expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), FAKE_EMBEDDING_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) {
        assert!((a - b).abs() <= 1e-6);
    }
}

#[tokio::test]
async fn embed_one_matches_batch_entry() {
    let embedder = FakeEmbedder::new(32);
    let one = embedder.embed_one("drones de vigilancia").await.unwrap();
    let batch = embedder.embed_batch(&["drones de vigilancia".to_string()]).await.unwrap();
    assert_eq!(one, batch[0]);
}

#[tokio::test]
async fn shared_words_increase_similarity() {
    let embedder = FakeEmbedder::default();
    let q = embedder.embed_text("¿Qué propone sobre drones?");
    let near = embedder.embed_text("Javier apoya drones de vigilancia.");
    let far = embedder.embed_text("Turismo en Salento y Filandia.");
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&q, &near) > dot(&q, &far));
}
