use std::fmt::Debug;

use super::{Credential, CredentialType};
use crate::domain::DomainError;

/// Trait for credential sources (environment, configuration, ...)
pub trait CredentialProvider: Send + Sync + Debug {
    /// Get a credential by its type
    fn get_credential(&self, credential_type: &CredentialType) -> Result<Credential, DomainError>;

    /// Check if a credential of this type can be produced
    fn supports(&self, credential_type: &CredentialType) -> bool {
        self.get_credential(credential_type).is_ok()
    }

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
