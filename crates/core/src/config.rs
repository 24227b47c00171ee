//! Configuration management for the guide service.
//!
//! Configuration is merged from, lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`GUIDE_CONFIG` or `<data_dir>/guide.yaml`)
//! - Environment variables
//! - Command-line flags
//!
//! All serving state (vector index, structured records, prompt overrides)
//! lives under the data directory and is read-only once the server starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// LLM providers the generator knows how to talk to.
pub const KNOWN_LLM_PROVIDERS: [&str; 2] = ["gemini", "mock"];

/// Embedding providers the knowledge store knows how to talk to.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "gemini"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the index, record files and prompt overrides
    pub data_dir: PathBuf,

    /// Config file that was merged, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Display name of the served region
    pub region: String,

    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub knowledge: KnowledgeSettings,
    pub prompt: PromptSettings,
    pub guard: GuardSettings,
    pub classifier: ClassifierSettings,
    pub logging: LoggingSettings,

    /// API key for the hosted model; never read from or written to YAML
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind
    pub bind: String,

    /// Upper bound on the whole request, generation included
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 90,
        }
    }
}

/// Hosted generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name ("gemini", "mock")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Optional endpoint override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub temperature: f32,
    pub max_output_tokens: u32,

    /// Timeout of a single generation call
    pub timeout_secs: u64,

    /// Extra attempts after a failed call; clamped to at most one
    pub max_retries: u32,

    pub retry_backoff_ms: u64,

    /// Generated answers longer than this are cut with an ellipsis
    pub answer_word_limit: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            endpoint: None,
            temperature: 0.7,
            max_output_tokens: 1024,
            timeout_secs: 20,
            max_retries: 1,
            retry_backoff_ms: 500,
            answer_word_limit: 200,
        }
    }
}

/// Knowledge store and retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// Index file, relative to the data directory unless absolute
    pub index_file: PathBuf,

    /// Number of passages to retrieve
    pub top_k: usize,

    /// Minimum cosine similarity for a passage to be kept
    pub min_score: f32,

    pub embedding: EmbeddingSettings,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            index_file: PathBuf::from("index.jsonl"),
            top_k: 4,
            min_score: 0.20,
            embedding: EmbeddingSettings::default(),
        }
    }
}

/// Query embedding settings. Must match the settings the index was built with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
        }
    }
}

/// Prompt composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Upper bound on system + user prompt length, in characters
    pub max_input_chars: usize,

    /// Directory with YAML prompt overrides (default: `<data_dir>/prompts`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            max_input_chars: 12_000,
            prompts_dir: None,
        }
    }
}

/// Domain guard policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// In-region place names and topics
    pub allow: Vec<String>,

    /// Out-of-region place names and topics
    pub deny: Vec<String>,

    /// Intents rejected unless an allow-list term is present
    pub require_region_for: Vec<String>,

    /// Let an allow-list hit cancel a deny-list hit
    pub allow_overrides_deny: bool,
}

impl Default for GuardSettings {
    fn default() -> Self {
        let allow = [
            "jharkhand",
            "ranchi",
            "jamshedpur",
            "deoghar",
            "dhanbad",
            "bokaro",
            "netarhat",
            "betla",
            "hundru",
            "jonha",
            "dassam",
            "hazaribagh",
            "parasnath",
            "giridih",
            "latehar",
            "khunti",
            "gumla",
            "dalma",
            "palamu",
            "lodh",
            "patratu",
            "rajrappa",
            "basukinath",
            "tatanagar",
            "dumka",
        ];
        let deny = [
            "paris",
            "london",
            "new york",
            "mumbai",
            "delhi",
            "bangalore",
            "bengaluru",
            "chennai",
            "goa",
            "kerala",
            "kashmir",
            "dubai",
            "singapore",
            "bali",
            "tokyo",
            "rajasthan",
            "manali",
            "shimla",
        ];

        Self {
            allow: allow.iter().map(|s| s.to_string()).collect(),
            deny: deny.iter().map(|s| s.to_string()).collect(),
            require_region_for: vec![
                "attractions".to_string(),
                "routes".to_string(),
                "hotels".to_string(),
            ],
            allow_overrides_deny: false,
        }
    }
}

/// How intents are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Keyword rules only
    #[default]
    Keyword,

    /// Hosted model first, keyword rules as fallback
    Model,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub mode: ClassifierMode,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub color: bool,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: None,
            color: true,
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            config_file: None,
            region: "Jharkhand".to_string(),
            server: ServerSettings::default(),
            llm: LlmSettings::default(),
            knowledge: KnowledgeSettings::default(),
            prompt: PromptSettings::default(),
            guard: GuardSettings::default(),
            classifier: ClassifierSettings::default(),
            logging: LoggingSettings::default(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML file and environment variables.
    ///
    /// Environment variables:
    /// - `GUIDE_DATA_DIR`: data directory
    /// - `GUIDE_CONFIG`: path to the YAML config file
    /// - `GUIDE_BIND`: socket address
    /// - `GUIDE_PROVIDER` / `GUIDE_MODEL`: generation provider and model
    /// - `GUIDE_API_KEY`, then `GOOGLE_API_KEY`: hosted model API key
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Like [`AppConfig::load`], with the data directory and config file
    /// given explicitly (e.g. from command-line flags).
    pub fn load_with(data_dir: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match data_dir {
            Some(dir) => config.data_dir = dir,
            None => {
                if let Ok(dir) = std::env::var("GUIDE_DATA_DIR") {
                    config.data_dir = PathBuf::from(dir);
                }
            }
        }

        let config_path = match config_file {
            Some(path) => Some(path),
            None => match std::env::var("GUIDE_CONFIG") {
                Ok(path) => Some(PathBuf::from(path)),
                Err(_) => {
                    let candidate = config.data_dir.join("guide.yaml");
                    candidate.exists().then_some(candidate)
                }
            },
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        config.apply_env();
        Ok(config)
    }

    /// Merge a YAML config file on top of this config.
    ///
    /// Sections missing from the file keep their current values' defaults.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut merged: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        // data_dir given in the file wins only if the file actually set it
        let file_sets_data_dir = serde_yaml::from_str::<serde_yaml::Value>(&contents)
            .ok()
            .and_then(|v| v.get("data_dir").cloned())
            .is_some();
        if !file_sets_data_dir {
            merged.data_dir = self.data_dir.clone();
        }

        merged.config_file = Some(path.to_path_buf());
        merged.api_key = self.api_key.clone();

        tracing::debug!("Merged config file {:?}", path);
        Ok(merged)
    }

    fn apply_env(&mut self) {
        if let Ok(bind) = std::env::var("GUIDE_BIND") {
            self.server.bind = bind;
        }

        if let Ok(provider) = std::env::var("GUIDE_PROVIDER") {
            self.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("GUIDE_MODEL") {
            self.llm.model = model;
        }

        self.api_key = std::env::var("GUIDE_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = Some(level);
        }

        if crate::logging::no_color_env() {
            self.logging.color = false;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Flags take precedence over the file and the environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        bind: Option<String>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }

        if let Some(bind) = bind {
            self.server.bind = bind;
        }

        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        if verbose && self.logging.level.is_none() {
            self.logging.level = Some("debug".to_string());
        }

        if no_color {
            self.logging.color = false;
        }

        self
    }

    /// Resolve a path that may be relative to the data directory.
    fn data_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// Path of the vector index file.
    pub fn index_path(&self) -> PathBuf {
        self.data_path(&self.knowledge.index_file)
    }

    /// Directory holding YAML prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        match self.prompt.prompts_dir {
            Some(ref dir) => self.data_path(dir),
            None => self.data_dir.join("prompts"),
        }
    }

    /// Path of a structured record file, e.g. `record_path("hotels")`.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    /// Validate the configuration before serving.
    ///
    /// Everything checked here is fatal: the process must not start with
    /// an invalid configuration.
    /// Longest a request can spend waiting on the model: every attempt timing
    /// out, plus the backoff between attempts. The model classifier adds a
    /// second generation with the same policy.
    pub fn generation_budget(&self) -> Duration {
        let retries = self.llm.max_retries.min(1);
        let per_generation = Duration::from_secs(self.llm.timeout_secs) * (1 + retries)
            + Duration::from_millis(self.llm.retry_backoff_ms) * retries;
        match self.classifier.mode {
            ClassifierMode::Keyword => per_generation,
            ClassifierMode::Model => per_generation * 2,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        let provider = self.llm.provider.as_str();
        if !KNOWN_LLM_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        let embedding_provider = self.knowledge.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding_provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let needs_key = provider == "gemini" || embedding_provider == "gemini";
        if needs_key && self.api_key.is_none() {
            return Err(AppError::Config(
                "API key not found: set GOOGLE_API_KEY (or GUIDE_API_KEY)".to_string(),
            ));
        }

        if self.knowledge.top_k == 0 {
            return Err(AppError::Config(
                "knowledge.top_k must be at least 1".to_string(),
            ));
        }

        if !(-1.0..=1.0).contains(&self.knowledge.min_score) {
            return Err(AppError::Config(format!(
                "knowledge.min_score must be within [-1, 1], got {}",
                self.knowledge.min_score
            )));
        }

        if self.knowledge.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "knowledge.embedding.dimensions must be positive".to_string(),
            ));
        }

        if self.prompt.max_input_chars < 256 {
            return Err(AppError::Config(format!(
                "prompt.max_input_chars is too small: {}",
                self.prompt.max_input_chars
            )));
        }

        let budget = self.generation_budget();
        if Duration::from_secs(self.server.request_timeout_secs) <= budget {
            return Err(AppError::Config(format!(
                "server.request_timeout_secs ({}s) must exceed the worst-case generation time ({:?}); raise it or lower llm.timeout_secs",
                self.server.request_timeout_secs, budget
            )));
        }

        let index_path = self.index_path();
        if !index_path.exists() {
            return Err(AppError::Config(format!(
                "Knowledge index not found: {:?}",
                index_path
            )));
        }

        Ok(())
    }
}
