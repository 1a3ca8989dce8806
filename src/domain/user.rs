//! User domain entity.
//!
//! Users are created by the identity system; this service only reads them
//! to resolve sessions and to seed a user's first team.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Display name, may be absent for users who signed up by email only
    pub name: Option<String>,
    /// Billing plan carried over to the user's first team
    pub plan: Option<String>,
    pub stripe_id: Option<String>,
    pub subscription_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with no name and no billing state
    pub fn new(id: Uuid, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            name: None,
            plan: None,
            stripe_id: None,
            subscription_id: None,
            starts_at: None,
            ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, treating an empty name as absent
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_ignores_empty() {
        let user = User::new(Uuid::new_v4(), "a@example.com".to_string()).with_name("");
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn test_display_name_present() {
        let user = User::new(Uuid::new_v4(), "a@example.com".to_string()).with_name("Ada");
        assert_eq!(user.display_name(), Some("Ada"));
    }
}
