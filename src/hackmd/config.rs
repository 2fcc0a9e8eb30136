use crate::error::{HackmdError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_BASE_URL: &str = "https://api.hackmd.io/v1";
const CONFIG_FILENAME: &str = "config.json";

/// Overrides the config directory; used by the integration tests.
pub const CONFIG_DIR_ENV: &str = "HACKMD_CONFIG_DIR";

/// One named credential set, selectable as the active profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub api_token: String,
    pub api_base_url: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_token: token.into(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// On-disk shape of config.json.
///
/// Pre-profile releases stored a single `api_token`/`api_base_url` pair at
/// the top level. Those fields are still read as a fallback and carried
/// through rewrites, but current code never assigns them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<BTreeMap<String, Credential>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Defaults>,

    /// Scalar keys set via `config set`; kept as-is across rewrites.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Result of a successful `auth status` lookup.
#[derive(Debug, Clone)]
pub struct AuthStatus {
    pub profile: String,
    pub credential: Credential,
}

/// Mask a token for display. Long tokens keep their first 8 and last 4
/// characters; anything at or below 12 characters is fully hidden.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// Credential profile store backed by a single JSON file.
///
/// Every mutation loads, modifies and rewrites the whole file. Concurrent
/// invocations race and the last writer wins; the tool is a short-lived
/// single-user process, so no locking is done.
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user config directory, honoring the env override.
    pub fn default_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return PathBuf::from(dir);
        }
        ProjectDirs::from("io", "hackmd", "hackmd")
            .expect("Could not determine config dir")
            .config_dir()
            .to_path_buf()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILENAME)
    }

    /// Load the config file, or `None` if it does not exist yet.
    pub fn load(&self) -> Result<Option<Config>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Rewrite the whole file and restrict it to owner read/write.
    pub fn save(&self, config: &Config) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.config_path();
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&path, content)?;
        restrict_mode(&path)?;
        Ok(())
    }

    /// Store `token` under `profile` and make it the active profile.
    ///
    /// The token is trimmed first; an empty result is a validation error.
    /// Remote verification is the CLI layer's concern and never rolls a
    /// persisted login back.
    pub fn login(&self, token: &str, profile: &str) -> Result<Credential> {
        let token = token.trim();
        if token.is_empty() {
            return Err(HackmdError::Validation("Token cannot be empty".to_string()));
        }

        let mut config = self.load()?.unwrap_or_default();
        let credential = Credential::new(token);
        config
            .profiles
            .get_or_insert_with(BTreeMap::new)
            .insert(profile.to_string(), credential.clone());
        config.active_profile = Some(profile.to_string());
        self.save(&config)?;
        Ok(credential)
    }

    /// Active profile and its credential, for `auth status`.
    ///
    /// Fails with `NotAuthenticated` when there is no config file or the
    /// active profile has no entry in `profiles` (the legacy top-level
    /// token does not count as a profile).
    pub fn status(&self) -> Result<AuthStatus> {
        let config = self.load()?.ok_or(HackmdError::NotAuthenticated)?;
        let profile = config
            .active_profile
            .clone()
            .unwrap_or_else(|| "default".to_string());
        let credential = config
            .profiles
            .as_ref()
            .and_then(|profiles| profiles.get(&profile))
            .cloned()
            .ok_or(HackmdError::NotAuthenticated)?;
        Ok(AuthStatus {
            profile,
            credential,
        })
    }

    /// Credential every API-calling command should use, or `None` when
    /// unauthenticated. Falls back to the legacy top-level token when no
    /// profile matches.
    pub fn resolve_active(&self) -> Result<Option<Credential>> {
        let Some(config) = self.load()? else {
            return Ok(None);
        };

        let profile = config
            .active_profile
            .clone()
            .unwrap_or_else(|| "default".to_string());
        if let Some(credential) = config
            .profiles
            .as_ref()
            .and_then(|profiles| profiles.get(&profile))
        {
            return Ok(Some(credential.clone()));
        }

        if let Some(token) = config.api_token {
            return Ok(Some(Credential {
                api_token: token,
                api_base_url: config
                    .api_base_url
                    .unwrap_or_else(|| API_BASE_URL.to_string()),
            }));
        }

        Ok(None)
    }

    /// Set a configuration value. `default.team` nests under `defaults`;
    /// every other key becomes a top-level string field.
    ///
    /// Fails with `NotConfigured` before the first login.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let mut config = self.load()?.ok_or(HackmdError::NotConfigured)?;
        match key {
            "default.team" => {
                config.defaults.get_or_insert_with(Defaults::default).team =
                    Some(value.to_string());
            }
            // these already exist as named fields; routing them through
            // `extra` would emit the key twice
            "api_token" => config.api_token = Some(value.to_string()),
            "api_base_url" => config.api_base_url = Some(value.to_string()),
            _ => {
                config
                    .extra
                    .insert(key.to_string(), serde_json::Value::String(value.to_string()));
            }
        }
        self.save(&config)
    }
}

#[cfg(unix)]
fn restrict_mode(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_mode(_path: &Path) -> Result<()> {
    Ok(())
}
