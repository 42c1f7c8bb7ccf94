// src/infrastructure/identity.rs
use crate::application::IdentityProvider;
use crate::domain::{DomainError, IdentityProfile};
use crate::infrastructure::config::IdentityConfig;

/// Identity taken from the `[identity]` config section.
///
/// Without an id nobody is signed in, which reads as a cancelled sign-in.
#[derive(Debug, Clone)]
pub struct ConfiguredIdentity {
    config: IdentityConfig,
}

impl ConfiguredIdentity {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }
}

fn present(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl IdentityProvider for ConfiguredIdentity {
    fn authenticate(&mut self) -> Result<IdentityProfile, DomainError> {
        let subject = present(&self.config.id).ok_or(DomainError::AuthCancelled)?;
        Ok(IdentityProfile {
            subject,
            email: present(&self.config.email),
            display_name: present(&self.config.display_name),
            photo_url: present(&self.config.photo_url),
        })
    }
}
