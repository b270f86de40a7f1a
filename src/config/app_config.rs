use serde::Deserialize;

use crate::domain::VerificationConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reranker: RerankerConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub verification: VerificationSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Rerank service settings
#[derive(Debug, Clone, Deserialize)]
pub struct RerankerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rerank_url")]
    pub api_url: String,
    #[serde(default = "default_rerank_model")]
    pub model: String,
    #[serde(default = "default_rerank_timeout_secs")]
    pub timeout_secs: u64,
    /// Used only when `JINA_API_KEY` is not set
    #[serde(default)]
    pub api_key: Option<String>,
    /// Start disabled when any of `hosted_env_vars` is present
    #[serde(default = "default_true")]
    pub disable_on_hosted: bool,
    #[serde(default = "default_hosted_env_vars")]
    pub hosted_env_vars: Vec<String>,
    #[serde(default)]
    pub max_retries: u32,
}

/// Which judge backend to construct
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JudgeBackend {
    Mistral,
    #[default]
    Ollama,
}

/// Judge model settings
#[derive(Debug, Clone, Deserialize)]
pub struct JudgeConfig {
    #[serde(default)]
    pub provider: JudgeBackend,
    #[serde(default = "default_judge_model")]
    pub model: String,
    /// Backend default when unset
    #[serde(default)]
    pub base_url: Option<String>,
    /// Used only when `MISTRAL_API_KEY` is not set
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default = "default_judge_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

/// Pipeline defaults
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationSection {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_true")]
    pub use_rerank: bool,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rerank_url() -> String {
    "https://api.jina.ai/v1/rerank".to_string()
}

fn default_rerank_model() -> String {
    "jina-reranker-m0".to_string()
}

fn default_rerank_timeout_secs() -> u64 {
    15
}

fn default_hosted_env_vars() -> Vec<String> {
    vec![
        "RAILWAY_ENVIRONMENT".to_string(),
        "RAILWAY_PROJECT_ID".to_string(),
    ]
}

fn default_judge_model() -> String {
    "llama3".to_string()
}

fn default_judge_timeout_secs() -> u64 {
    30
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_top_k() -> usize {
    10
}

fn default_concurrency() -> usize {
    4
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_rerank_url(),
            model: default_rerank_model(),
            timeout_secs: default_rerank_timeout_secs(),
            api_key: None,
            disable_on_hosted: true,
            hosted_env_vars: default_hosted_env_vars(),
            max_retries: 0,
        }
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            provider: JudgeBackend::default(),
            model: default_judge_model(),
            base_url: None,
            api_key: None,
            temperature: 0.0,
            max_output_tokens: None,
            timeout_secs: default_judge_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl Default for VerificationSection {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            top_k: default_top_k(),
            use_rerank: true,
            concurrency: default_concurrency(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("EVIDENCE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("reranker.hosted_env_vars"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Pipeline configuration assembled from the verification and judge sections
    pub fn verification_config(&self) -> VerificationConfig {
        let mut config = VerificationConfig::new()
            .with_confidence_threshold(self.verification.confidence_threshold)
            .with_top_k(self.verification.top_k)
            .with_rerank(self.verification.use_rerank)
            .with_concurrency(self.verification.concurrency)
            .with_temperature(self.judge.temperature)
            .with_judge_timeout_ms(self.judge.timeout_secs.saturating_mul(1000));

        if let Some(tokens) = self.judge.max_output_tokens {
            config = config.with_max_output_tokens(tokens);
        }

        config
    }
}
