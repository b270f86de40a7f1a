//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, JudgeBackend, JudgeConfig, LogFormat, LoggingConfig, RerankerConfig,
    VerificationSection,
};
