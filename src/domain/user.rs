// src/domain/user.rs
use crate::domain::Author;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Subject id issued by the identity provider.
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_profile(profile: &IdentityProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: profile.subject.clone(),
            email: profile.email.clone().unwrap_or_default(),
            display_name: profile.display_name.clone().unwrap_or_default(),
            photo_url: profile.photo_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Author snapshot stored on notes this user creates.
    pub fn as_author(&self) -> Author {
        Author {
            id: self.id.clone(),
            name: self.display_name.clone(),
            email: self.email.clone(),
        }
    }

    /// Adopt the provider's current profile values.
    ///
    /// Values the provider does not report keep their stored value. Returns
    /// whether anything changed.
    pub fn reconcile(&mut self, profile: &IdentityProfile, now: DateTime<Utc>) -> bool {
        let email = non_empty(&profile.email).unwrap_or(&self.email).to_string();
        let display_name = non_empty(&profile.display_name)
            .unwrap_or(&self.display_name)
            .to_string();
        let photo_url = non_empty(&profile.photo_url)
            .map(str::to_string)
            .or_else(|| self.photo_url.clone());

        let changed =
            email != self.email || display_name != self.display_name || photo_url != self.photo_url;
        if changed {
            self.email = email;
            self.display_name = display_name;
            self.photo_url = photo_url;
            self.updated_at = now;
        }
        changed
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Profile fields as reported by the identity provider at sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityProfile {
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}
