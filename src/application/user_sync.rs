// src/application/user_sync.rs
use crate::domain::{DomainError, IdentityProfile, User};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Storage of the `users` collection.
pub trait UserStore {
    fn get_user(&mut self, id: &str) -> Result<Option<User>, DomainError>;

    fn put_user(&mut self, user: &User) -> Result<(), DomainError>;
}

impl<T: UserStore + ?Sized> UserStore for &mut T {
    fn get_user(&mut self, id: &str) -> Result<Option<User>, DomainError> {
        (**self).get_user(id)
    }

    fn put_user(&mut self, user: &User) -> Result<(), DomainError> {
        (**self).put_user(user)
    }
}

/// External sign-in. A dismissed prompt is [`DomainError::AuthCancelled`].
pub trait IdentityProvider {
    fn authenticate(&mut self) -> Result<IdentityProfile, DomainError>;
}

pub struct UserSync<S: UserStore, P: IdentityProvider> {
    store: S,
    provider: P,
}

impl<S: UserStore, P: IdentityProvider> UserSync<S, P> {
    pub fn new(store: S, provider: P) -> Self {
        Self { store, provider }
    }

    /// Sign in and reconcile the stored user record with the provider profile.
    ///
    /// Returns `Ok(None)` when the user cancelled the sign-in.
    pub fn sign_in(&mut self) -> Result<Option<User>, DomainError> {
        let profile = match self.provider.authenticate() {
            Ok(profile) => profile,
            Err(DomainError::AuthCancelled) => {
                info!("Sign-in cancelled by user");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        self.reconcile(&profile, Utc::now()).map(Some)
    }

    fn reconcile(&mut self, profile: &IdentityProfile, now: DateTime<Utc>) -> Result<User, DomainError> {
        if profile.subject.trim().is_empty() {
            return Err(DomainError::Validation("identity has no subject id".to_string()));
        }
        match self.store.get_user(&profile.subject)? {
            Some(mut user) => {
                if user.reconcile(profile, now) {
                    self.store.put_user(&user)?;
                    debug!(user_id = %user.id, "Updated user profile from identity provider");
                }
                Ok(user)
            }
            None => {
                let user = User::from_profile(profile, now);
                self.store.put_user(&user)?;
                info!(user_id = %user.id, "Created user on first sign-in");
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryBackend;

    struct FixedProvider(Result<IdentityProfile, DomainError>);

    impl IdentityProvider for FixedProvider {
        fn authenticate(&mut self) -> Result<IdentityProfile, DomainError> {
            self.0.clone()
        }
    }

    fn profile(name: &str) -> IdentityProfile {
        IdentityProfile {
            subject: "uid-1".to_string(),
            email: Some("ada@example.com".to_string()),
            display_name: Some(name.to_string()),
            photo_url: None,
        }
    }

    #[test]
    fn given_first_sign_in_when_signing_in_then_creates_user() {
        let mut backend = InMemoryBackend::new();
        let mut sync = UserSync::new(&mut backend, FixedProvider(Ok(profile("Ada"))));

        let user = sync.sign_in().unwrap().expect("signed in");

        assert_eq!(user.display_name, "Ada");
        assert!(backend.get_user("uid-1").unwrap().is_some());
    }

    #[test]
    fn given_changed_profile_when_signing_in_again_then_updates_stored_user() {
        let mut backend = InMemoryBackend::new();
        UserSync::new(&mut backend, FixedProvider(Ok(profile("Ada"))))
            .sign_in()
            .unwrap();

        let user = UserSync::new(&mut backend, FixedProvider(Ok(profile("Ada L."))))
            .sign_in()
            .unwrap()
            .unwrap();

        assert_eq!(user.display_name, "Ada L.");
        assert_eq!(backend.get_user("uid-1").unwrap().unwrap().display_name, "Ada L.");
        assert!(user.updated_at >= user.created_at);
    }

    #[test]
    fn given_cancelled_prompt_when_signing_in_then_returns_none() {
        let mut backend = InMemoryBackend::new();
        let mut sync = UserSync::new(&mut backend, FixedProvider(Err(DomainError::AuthCancelled)));

        assert_eq!(sync.sign_in().unwrap(), None);
    }

    #[test]
    fn given_provider_failure_when_signing_in_then_propagates_error() {
        let mut backend = InMemoryBackend::new();
        let mut sync = UserSync::new(
            &mut backend,
            FixedProvider(Err(DomainError::Backend("provider down".to_string()))),
        );

        assert!(sync.sign_in().is_err());
    }
}
