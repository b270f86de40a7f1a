use serde::{Deserialize, Serialize};

/// Type of credential (which external service it unlocks)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    /// Rerank service bearer token
    Jina,
    /// Cloud judge backend
    Mistral,
}

/// Credential entity containing an API key
#[derive(Clone)]
pub struct Credential {
    credential_type: CredentialType,
    api_key: String,
}

impl Credential {
    pub fn new(credential_type: CredentialType, api_key: impl Into<String>) -> Self {
        Self {
            credential_type,
            api_key: api_key.into(),
        }
    }

    pub fn credential_type(&self) -> &CredentialType {
        &self.credential_type
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Value for an `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("credential_type", &self.credential_type)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialType::Jina => write!(f, "jina"),
            CredentialType::Mistral => write!(f, "mistral"),
        }
    }
}
