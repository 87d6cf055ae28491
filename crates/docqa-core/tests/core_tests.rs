use std::fs;
use tempfile::TempDir;

use docqa_core::chunker::{load_document, Chunker, DEFAULT_CHUNK_DELIMITER};
use docqa_core::config::{Config, DEFAULT_TOP_K};
use docqa_core::refusal::REFUSAL_SENTENCE;

fn normalize(s: &str) -> String {
    s.split(DEFAULT_CHUNK_DELIMITER)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(DEFAULT_CHUNK_DELIMITER)
}

#[test]
fn chunks_rejoin_to_the_document() {
    let docs = [
        "Javier apoya drones de vigilancia.\n\nJavier promete 500 empleos jóvenes.",
        "\n\n  Primer párrafo\ncon dos líneas.  \n\n\n\nSegundo.\n\n   \n\nTercero \n",
        "solo un párrafo",
    ];
    let chunker = Chunker::default();
    for doc in docs {
        let chunks = chunker.chunk(doc).expect("chunk");
        for c in &chunks {
            assert!(!c.text.trim().is_empty(), "chunk {} is blank", c.id);
            assert_eq!(c.text, c.text.trim(), "chunk {} is trimmed", c.id);
        }
        let rejoined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(DEFAULT_CHUNK_DELIMITER);
        assert_eq!(rejoined, normalize(doc));
    }
}

#[test]
fn load_document_reads_utf8_and_lossy_bytes() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("good.txt");
    fs::write(&good, "Agro y campo.\n\nTurismo en Salento.").unwrap();
    assert_eq!(load_document(&good).unwrap(), "Agro y campo.\n\nTurismo en Salento.");

    let bad = tmp.path().join("bad.txt");
    fs::write(&bad, [b'c', b'a', b'f', 0xE9, b'\n']).unwrap();
    let text = load_document(&bad).unwrap();
    assert!(text.starts_with("caf"));
    assert!(text.contains('\u{FFFD}'));

    assert!(load_document(&tmp.path().join("missing.txt")).is_err());
}

#[test]
fn config_defaults_without_files() {
    let tmp = TempDir::new().unwrap();
    let config = Config::load_from(tmp.path(), "dev").expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.pipeline.top_k, DEFAULT_TOP_K);
    assert_eq!(settings.pipeline.refusal_sentence, REFUSAL_SENTENCE);
    assert!(settings.topics.contains_key("Seguridad"));
    assert_eq!(config.document_path(&settings), tmp.path().join("data/programa.txt"));
}

#[test]
fn env_file_overrides_base_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[pipeline]\ntop_k = 4\ncompletion_model = \"base-model\"\n\n[document]\npath = \"doc.txt\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[pipeline]\ntop_k = 2\n").unwrap();

    let settings = Config::load_from(tmp.path(), "test").unwrap().settings().unwrap();
    assert_eq!(settings.pipeline.top_k, 2);
    assert_eq!(settings.pipeline.completion_model, "base-model");

    let dev = Config::load_from(tmp.path(), "dev").unwrap();
    assert_eq!(dev.get::<usize>("pipeline.top_k").unwrap(), 4);
}

#[test]
fn invalid_values_fail_settings() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[pipeline]\ntop_k = 0\n").unwrap();
    assert!(Config::load_from(tmp.path(), "dev").unwrap().settings().is_err());

    fs::write(tmp.path().join("config.toml"), "[provider]\ntimeout_secs = 0\n").unwrap();
    assert!(Config::load_from(tmp.path(), "dev").unwrap().settings().is_err());
}
