//! Layered configuration and path helpers.
//!
//! Figment merges, lowest precedence first: built-in defaults, `config.toml`,
//! `config.<env>.toml` and `APP_*` environment variables (`__` separates
//! nesting levels, e.g. `APP_PIPELINE__TOP_K=5`). The typed view is
//! [`Settings`]; [`Config::get`] stays available for ad-hoc keys.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::chunker::DEFAULT_CHUNK_DELIMITER;
use crate::error::{Error, Result};
use crate::refusal::{REFUSAL_MARKER, REFUSAL_SENTENCE};

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_SYSTEM_PERSONA: &str = "Eres un asistente de campaña política servicial y preciso.";
const DEFAULT_GROUNDING_PREAMBLE: &str = "Eres el asistente digital de Javier Montoya. Tu misión es responder preguntas basándote ESTRICTA Y ÚNICAMENTE en la siguiente información oficial:";

/// Everything the answering pipeline needs at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub embedding_model: String,
    pub completion_model: String,
    pub top_k: usize,
    /// System instruction sent with every completion request.
    pub system_persona: String,
    /// Opening of the user prompt, right before the context block.
    pub grounding_preamble: String,
    pub refusal_sentence: String,
    /// Substring of `refusal_sentence` used to detect unanswered questions.
    pub refusal_marker: String,
    pub chunk_delimiter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            embedding_model: "text-embedding-ada-002".to_string(),
            completion_model: "gpt-4o-mini".to_string(),
            top_k: DEFAULT_TOP_K,
            system_persona: DEFAULT_SYSTEM_PERSONA.to_string(),
            grounding_preamble: DEFAULT_GROUNDING_PREAMBLE.to_string(),
            refusal_sentence: REFUSAL_SENTENCE.to_string(),
            refusal_marker: REFUSAL_MARKER.to_string(),
            chunk_delimiter: DEFAULT_CHUNK_DELIMITER.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("pipeline.top_k must be at least 1".to_string()));
        }
        if self.embedding_model.trim().is_empty() || self.completion_model.trim().is_empty() {
            return Err(Error::InvalidConfig("model identifiers must not be empty".to_string()));
        }
        if self.chunk_delimiter.is_empty() {
            return Err(Error::InvalidConfig("pipeline.chunk_delimiter must not be empty".to_string()));
        }
        if self.refusal_marker.is_empty() || !self.refusal_sentence.contains(&self.refusal_marker) {
            return Err(Error::InvalidConfig(format!(
                "pipeline.refusal_sentence must contain the refusal marker '{}'",
                self.refusal_marker
            )));
        }
        Ok(())
    }
}

/// Connection settings shared by the embedding and completion clients.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self { api_key: None, base_url: DEFAULT_BASE_URL.to_string(), timeout_secs: DEFAULT_TIMEOUT_SECS }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub path: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self { path: "data/programa.txt".to_string() }
    }
}

/// Keyword lists per topic, used by the session topic tally.
pub fn default_topics() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 5] = [
        ("Seguridad", &["seguridad", "policía", "drones", "hurto"]),
        ("Empleo", &["empleo", "trabajo", "jóvenes", "emprendimiento"]),
        ("Turismo", &["turismo", "salento", "filandia", "viajes"]),
        ("Agro", &["agro", "campo", "cafeteros", "agricultores"]),
        ("Corrupción", &["corrupción", "transparencia", "robar"]),
    ];
    table
        .into_iter()
        .map(|(topic, words)| (topic.to_string(), words.iter().map(|w| (*w).to_string()).collect()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub document: DocumentConfig,
    pub pipeline: PipelineConfig,
    pub provider: ProviderConfig,
    pub topics: BTreeMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            document: DocumentConfig::default(),
            pipeline: PipelineConfig::default(),
            provider: ProviderConfig::default(),
            topics: default_topics(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if self.provider.timeout_secs == 0 {
            return Err(Error::InvalidConfig("provider.timeout_secs must be greater than zero".to_string()));
        }
        if self.document.path.trim().is_empty() {
            return Err(Error::InvalidConfig("document.path must not be empty".to_string()));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    env_name: String,
    base_dir: PathBuf,
}

impl Config {
    /// Load from the current directory for the environment named by `RUST_ENV`.
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(base_dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment, env_name: env_name.to_string(), base_dir: base_dir.to_path_buf() })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed, validated view of the merged configuration.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to parse configuration: {}", e))?;
        if settings.provider.api_key.is_none() {
            settings.provider.api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty());
        }
        settings.validate()?;
        self.validate_for_env(&settings)?;
        Ok(settings)
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Absolute-or-relative location of the knowledge document.
    pub fn document_path(&self, settings: &Settings) -> PathBuf {
        resolve_with_base(&self.base_dir, &settings.document.path)
    }

    fn validate_for_env(&self, settings: &Settings) -> anyhow::Result<()> {
        match self.env_name.as_str() {
            "prod" | "production" if settings.provider.api_key.is_none() => {
                anyhow::bail!("provider.api_key (or OPENAI_API_KEY) is required in production")
            }
            _ => Ok(()),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against `base` after expansion.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().expect("defaults validate");
        assert_eq!(PipelineConfig::default().top_k, DEFAULT_TOP_K);
    }

    #[test]
    fn refusal_sentence_must_carry_marker() {
        let cfg = PipelineConfig { refusal_sentence: "No sé.".to_string(), ..PipelineConfig::default() };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let cfg = PipelineConfig { top_k: 0, ..PipelineConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = ProviderConfig { api_key: Some("sk-secret".to_string()), ..ProviderConfig::default() };
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let base = Path::new("/srv/docqa");
        assert_eq!(resolve_with_base(base, "data/a.txt"), PathBuf::from("/srv/docqa/data/a.txt"));
        assert_eq!(resolve_with_base(base, "/abs/a.txt"), PathBuf::from("/abs/a.txt"));
    }
}
