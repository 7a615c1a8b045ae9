use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_PROFILE: &str = "default";
pub const CREDENTIAL_KEY: &str = "OPENAI_API_KEY";

/// Errors raised while loading the credential. All of them are fatal:
/// without a usable key every later request would fail anyway.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read config file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("config has no [{0}] profile")]
    MissingProfile(String),

    #[error("profile [{profile}] doesn't set a non-empty {CREDENTIAL_KEY}")]
    MissingCredential { profile: String },
}

/// The parsed config file: one TOML table per profile.
#[derive(Debug, Clone)]
pub struct Config {
    profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(rename = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        let profiles = toml::from_str(&src).map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { profiles })
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::MissingProfile(name.to_string()))
    }
}

/// Reads the config file and extracts the API credential of the given
/// profile. The credential must be present and non-empty.
pub fn load_credential(path: impl AsRef<Path>, profile: &str) -> Result<String, ConfigError> {
    let config = Config::load(path)?;
    let settings = config.profile(profile)?;
    match settings.openai_api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(key.to_string()),
        _ => Err(ConfigError::MissingCredential {
            profile: profile.to_string(),
        }),
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn returns_the_credential_of_the_requested_profile() {
        let (_dir, path) = write_config(
            r#"
            [default]
            OPENAI_API_KEY = "sk-default"

            [staging]
            OPENAI_API_KEY = "sk-staging"
            "#,
        );

        assert_eq!(load_credential(&path, "default").unwrap(), "sk-default");
        assert_eq!(load_credential(&path, "staging").unwrap(), "sk-staging");
    }

    #[test]
    fn missing_profile_is_an_error() {
        let (_dir, path) = write_config(
            r#"
            [staging]
            OPENAI_API_KEY = "sk-staging"
            "#,
        );

        let err = load_credential(&path, DEFAULT_PROFILE).unwrap_err();
        assert!(matches!(err, ConfigError::MissingProfile(name) if name == "default"));
    }

    #[test]
    fn missing_credential_key_is_an_error() {
        let (_dir, path) = write_config("[default]\nmodel = \"gpt-4o\"\n");

        let err = load_credential(&path, "default").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { profile } if profile == "default"
        ));
    }

    #[test]
    fn empty_credential_is_an_error() {
        let (_dir, path) = write_config("[default]\nOPENAI_API_KEY = \"  \"\n");

        let err = load_credential(&path, "default").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let err = load_credential("/nonexistent/config.toml", "default").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let (_dir, path) = write_config("[default\nOPENAI_API_KEY = ");

        let err = load_credential(&path, "default").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
