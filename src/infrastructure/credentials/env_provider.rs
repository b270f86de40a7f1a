use std::collections::HashMap;
use std::env;

use crate::domain::{Credential, CredentialProvider, CredentialType, DomainError};

/// Credential provider that reads API keys from environment variables.
///
/// The environment always wins; a configured fallback key is used only when
/// the variable is unset or blank.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider {
    mappings: HashMap<CredentialType, String>,
    fallbacks: HashMap<CredentialType, String>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(
        mut self,
        credential_type: CredentialType,
        env_var: impl Into<String>,
    ) -> Self {
        self.mappings.insert(credential_type, env_var.into());
        self
    }

    pub fn with_defaults(self) -> Self {
        self.with_mapping(CredentialType::Jina, "JINA_API_KEY")
            .with_mapping(CredentialType::Mistral, "MISTRAL_API_KEY")
    }

    /// Key to use when the environment has none. Blank keys are ignored.
    pub fn with_fallback(
        mut self,
        credential_type: CredentialType,
        api_key: Option<String>,
    ) -> Self {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.fallbacks.insert(credential_type, key);
        }
        self
    }

    fn from_env(&self, credential_type: &CredentialType) -> Option<String> {
        let var = self.mappings.get(credential_type)?;
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn get_credential(&self, credential_type: &CredentialType) -> Result<Credential, DomainError> {
        if let Some(key) = self.from_env(credential_type) {
            return Ok(Credential::new(credential_type.clone(), key));
        }

        if let Some(key) = self.fallbacks.get(credential_type) {
            return Ok(Credential::new(credential_type.clone(), key.clone()));
        }

        match self.mappings.get(credential_type) {
            Some(var) => Err(DomainError::credential(format!(
                "Environment variable '{}' not set and no configured key for credential type: {}",
                var, credential_type
            ))),
            None => Err(DomainError::credential(format!(
                "No key configured for credential type: {}",
                credential_type
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "env"
    }
}
