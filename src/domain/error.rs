use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService {
        service: String,
        message: String,
        /// Timeouts, transport failures and 5xx responses
        transient: bool,
    },

    #[error("Judge invocation error: {provider} - {message}")]
    JudgeInvocation {
        provider: String,
        message: String,
        transient: bool,
    },

    #[error("Judge parse error: {message}")]
    JudgeParse { message: String },

    #[error("Timeout: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// External failure worth another attempt
    pub fn service_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
            transient: true,
        }
    }

    pub fn judge_invocation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JudgeInvocation {
            provider: provider.into(),
            message: message.into(),
            transient: false,
        }
    }

    /// Re-attribute an HTTP-level failure to the named service, keeping
    /// its transience
    pub fn for_service(self, service: &str) -> Self {
        match self {
            Self::ExternalService {
                message, transient, ..
            } => Self::ExternalService {
                service: service.to_string(),
                message,
                transient,
            },
            other => other,
        }
    }

    /// Re-attribute an HTTP-level failure to a judge backend
    pub fn for_judge(self, provider: &str) -> Self {
        match self {
            Self::ExternalService {
                message, transient, ..
            } => Self::JudgeInvocation {
                provider: provider.to_string(),
                message,
                transient,
            },
            other => other,
        }
    }

    pub fn judge_parse(message: impl Into<String>) -> Self {
        Self::JudgeParse {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Whether the failure is worth another attempt (timeouts, transport
    /// failures and 5xx responses)
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::ExternalService { transient, .. } | Self::JudgeInvocation { transient, .. } => {
                *transient
            }
            _ => false,
        }
    }

    /// Whether this error means the component cannot be used at all
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Credential { .. })
    }
}
