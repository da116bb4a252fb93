use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a tracker workspace.
///
/// Controls where collections are persisted, which folder backs the document
/// library, how far ahead "due soon" looks, and who the current user is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Storage key of the questionnaire collection.
    questionnaire_key: String,

    /// Storage key of the follow-up collection.
    follow_up_key: String,

    /// Folder holding shared documents, relative to the workspace root.
    documents_folder: String,

    /// Width of the "due soon" window in days.
    ///
    /// A record is due soon when its deadline falls between today and today
    /// plus this many days, inclusive.
    due_soon_days: u32,

    /// The current user's profile, if configured.
    pub profile: Option<ProfileConfig>,
}

/// The `[profile]` table of the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Name shown in greetings.
    pub display_name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Account name.
    #[serde(default)]
    pub login_name: String,
    /// Groups the user belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupConfig>,
}

/// One entry of `profile.groups`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group name.
    pub title: String,
    /// What the group is for.
    #[serde(default)]
    pub description: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questionnaire_key: default_questionnaire_key(),
            follow_up_key: default_follow_up_key(),
            documents_folder: default_documents_folder(),
            due_soon_days: default_due_soon_days(),
            profile: None,
        }
    }
}

/// Failure to read or write a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[source] std::io::Error),
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The file could not be written.
    #[error("failed to write config file: {0}")]
    Write(#[source] std::io::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// Storage key of the questionnaire collection.
    #[must_use]
    pub fn questionnaire_key(&self) -> &str {
        &self.questionnaire_key
    }

    /// Storage key of the follow-up collection.
    #[must_use]
    pub fn follow_up_key(&self) -> &str {
        &self.follow_up_key
    }

    /// Folder holding shared documents, relative to the workspace root.
    #[must_use]
    pub fn documents_folder(&self) -> &str {
        &self.documents_folder
    }

    /// Width of the "due soon" window in days.
    #[must_use]
    pub const fn due_soon_days(&self) -> u32 {
        self.due_soon_days
    }

    /// Sets the width of the "due soon" window.
    pub const fn set_due_soon_days(&mut self, days: u32) {
        self.due_soon_days = days;
    }
}

fn default_questionnaire_key() -> String {
    "INA_OECD_QUESTIONNAIRES".to_string()
}

fn default_follow_up_key() -> String {
    "INA_OECD_FOLLOWUPS".to_string()
}

fn default_documents_folder() -> String {
    "Shared Documents".to_string()
}

const fn default_due_soon_days() -> u32 {
    7
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_questionnaire_key")]
        questionnaire_key: String,

        #[serde(default = "default_follow_up_key")]
        follow_up_key: String,

        #[serde(default = "default_documents_folder")]
        documents_folder: String,

        #[serde(default = "default_due_soon_days")]
        due_soon_days: u32,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        profile: Option<ProfileConfig>,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                questionnaire_key,
                follow_up_key,
                documents_folder,
                due_soon_days,
                profile,
            } => Self {
                questionnaire_key,
                follow_up_key,
                documents_folder,
                due_soon_days,
                profile,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            questionnaire_key: config.questionnaire_key,
            follow_up_key: config.follow_up_key,
            documents_folder: config.documents_folder,
            due_soon_days: config.due_soon_days,
            profile: config.profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\ndocuments_folder = \"Evidence\"\ndue_soon_days = 14\n\n[profile]\ndisplay_name = \"Ana Reviewer\"\nemail = \"ana@example.org\"\n\n[[profile.groups]]\ntitle = \"Reviewers\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.documents_folder(), "Evidence");
        assert_eq!(config.due_soon_days(), 14);
        assert_eq!(config.questionnaire_key(), "INA_OECD_QUESTIONNAIRES");
        let profile = config.profile.unwrap();
        assert_eq!(profile.display_name, "Ana Reviewer");
        assert_eq!(profile.groups[0].title, "Reviewers");
        assert!(profile.groups[0].description.is_empty());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.to_string().starts_with("failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndue_soon_days = \"seven\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.to_string().starts_with("failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_due_soon_days(3);
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
