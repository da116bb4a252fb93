//! The current user's identity.

use crate::domain::{Config, ProfileConfig};

/// The current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Name shown in greetings.
    pub display_name: String,
    /// Contact email. May be empty.
    pub email: String,
    /// Account name. May be empty.
    pub login_name: String,
    /// Groups the user belongs to.
    pub groups: Vec<Group>,
}

/// A group the current user belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Group name.
    pub title: String,
    /// What the group is for.
    pub description: String,
}

/// Failure to determine the current user.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Neither a configured profile nor a login name is available.
    #[error("no user profile is configured; add a [profile] table to the workspace config")]
    NotConfigured,
}

/// A read-only source of the current user's profile.
pub trait IdentityProvider {
    /// The current user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be determined.
    fn current_user(&self) -> Result<Profile, IdentityError>;
}

/// Identity taken from the workspace configuration.
///
/// A `[profile]` table wins. Without one, the login name of the process owner
/// is used as the display name, and the user belongs to no groups.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    profile: Option<ProfileConfig>,
    login: Option<String>,
}

impl ConfiguredIdentity {
    /// An identity from an explicit profile and fallback login name.
    #[must_use]
    pub const fn new(profile: Option<ProfileConfig>, login: Option<String>) -> Self {
        Self { profile, login }
    }

    /// An identity from `config`, falling back to `USER` or `USERNAME`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let login = ["USER", "USERNAME"]
            .into_iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|login| !login.trim().is_empty());
        Self::new(config.profile.clone(), login)
    }
}

impl IdentityProvider for ConfiguredIdentity {
    fn current_user(&self) -> Result<Profile, IdentityError> {
        if let Some(profile) = &self.profile {
            return Ok(Profile {
                display_name: profile.display_name.clone(),
                email: profile.email.clone(),
                login_name: profile.login_name.clone(),
                groups: profile
                    .groups
                    .iter()
                    .map(|group| Group {
                        title: group.title.clone(),
                        description: group.description.clone(),
                    })
                    .collect(),
            });
        }

        let login = self.login.clone().ok_or(IdentityError::NotConfigured)?;
        tracing::debug!("no profile configured, using login name '{login}'");
        Ok(Profile {
            display_name: login.clone(),
            email: String::new(),
            login_name: login,
            groups: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::GroupConfig;

    use super::*;

    #[test]
    fn configured_profile_wins() {
        let profile = ProfileConfig {
            display_name: "Ana Reviewer".to_string(),
            email: "ana@example.org".to_string(),
            login_name: "ana".to_string(),
            groups: vec![GroupConfig {
                title: "Reviewers".to_string(),
                description: "Checks answers".to_string(),
            }],
        };
        let identity = ConfiguredIdentity::new(Some(profile), Some("root".to_string()));

        let user = identity.current_user().unwrap();
        assert_eq!(user.display_name, "Ana Reviewer");
        assert_eq!(user.groups.len(), 1);
        assert_eq!(user.groups[0].title, "Reviewers");
    }

    #[test]
    fn login_name_is_the_fallback() {
        let identity = ConfiguredIdentity::new(None, Some("ana".to_string()));
        let user = identity.current_user().unwrap();
        assert_eq!(user.display_name, "ana");
        assert_eq!(user.login_name, "ana");
        assert!(user.groups.is_empty());
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let identity = ConfiguredIdentity::new(None, None);
        assert!(matches!(
            identity.current_user().unwrap_err(),
            IdentityError::NotConfigured
        ));
    }
}
