//! Application configuration
//!
//! Sources, lowest to highest priority:
//! - built-in defaults
//! - TOML file (`--config` or `PATENTSCOPE_CONFIG`)
//! - environment variables (a `.env` file is loaded first if present)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Top-level configuration, loaded once at process start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub corpus: CorpusSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// JSON array or JSON-lines file with patent records
    pub path: PathBuf,
    /// Pre-built index snapshot aligned with corpus rows
    pub index_path: Option<PathBuf>,
    /// Dimension of the built-in hashing embedder
    pub embedding_dimension: usize,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/patents.json"),
            index_path: None,
            embedding_dimension: 384,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Never written back when the config is serialized
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    /// No cap when unset
    pub max_delay_ms: Option<u64>,
    pub request_timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_attempts: 5,
            initial_delay_ms: 1000,
            max_delay_ms: None,
            request_timeout_secs: 60,
        }
    }
}

impl GenerationSettings {
    /// API key, required only by commands that call the model
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is not set (env, .env or config file)"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources and validate it
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let file = config_path
            .map(Path::to_path_buf)
            .or_else(|| env::var("PATENTSCOPE_CONFIG").ok().map(PathBuf::from));

        let mut config = match file {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_vars(utf8_vars(env::vars_os()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Self::load_from_toml(&content)
    }

    pub fn load_from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply every recognised variable from `vars`; unknown keys are ignored
    pub fn apply_env_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            self.apply_env_var(&key, &value)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_err = || format!("Invalid value for {key}: {value:?}");

        match key {
            "GEMINI_API_KEY" => self.generation.api_key = Some(value.to_string()),
            "GEMINI_MODEL" => self.generation.model = value.to_string(),
            "GEMINI_BASE_URL" => self.generation.base_url = value.to_string(),
            "PATENTSCOPE_CORPUS" => self.corpus.path = PathBuf::from(value),
            "PATENTSCOPE_INDEX" => self.corpus.index_path = Some(PathBuf::from(value)),
            "PATENTSCOPE_EMBEDDING_DIM" => {
                self.corpus.embedding_dimension = value.parse().with_context(parse_err)?
            }
            "PATENTSCOPE_TOP_K" => self.retrieval.top_k = value.parse().with_context(parse_err)?,
            "PATENTSCOPE_MAX_ATTEMPTS" => {
                self.generation.max_attempts = value.parse().with_context(parse_err)?
            }
            "PATENTSCOPE_INITIAL_DELAY_MS" => {
                self.generation.initial_delay_ms = value.parse().with_context(parse_err)?
            }
            "PATENTSCOPE_MAX_DELAY_MS" => {
                self.generation.max_delay_ms = Some(value.parse().with_context(parse_err)?)
            }
            "PATENTSCOPE_LOG_LEVEL" => self.logging.level = value.to_lowercase(),
            "PATENTSCOPE_LOG_JSON" => self.logging.json = value.parse().unwrap_or(false),
            _ => {}
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(anyhow!("retrieval.top_k must be at least 1"));
        }
        if self.generation.max_attempts == 0 {
            return Err(anyhow!("generation.max_attempts must be at least 1"));
        }
        if self.corpus.embedding_dimension == 0 {
            return Err(anyhow!("corpus.embedding_dimension must be at least 1"));
        }
        if self.generation.model.trim().is_empty() {
            return Err(anyhow!("generation.model must not be empty"));
        }
        Ok(())
    }
}

/// Environment entries that are valid UTF-8; the rest are never ours to read
fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
}
