use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENDPOINT_ENV: &str = "QUIPU_ENDPOINT_URL";
pub const TRANSPORT_ENV: &str = "QUIPU_TRANSPORT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unable to resolve user data dir")]
    NoDataDir,
    #[error("Unable to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Unable to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transport must be 'post' or 'get', got '{0}'")]
    InvalidTransport(String),
}

/// How answers reach the endpoint.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON request body.
    #[default]
    Post,
    /// Whole payload in a `data` query parameter, for endpoints that mishandle cross-origin POST.
    Get,
}

impl Transport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Get => "get",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_lowercase().as_str() {
            "post" => Ok(Self::Post),
            "get" => Ok(Self::Get),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveySettings {
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub transport: Transport,
    pub storage_path: String,
}

impl SurveySettings {
    pub fn default_for(data_root: &Path) -> Self {
        Self {
            endpoint_url: None,
            transport: Transport::Post,
            storage_path: data_root
                .join("survey.sqlite3")
                .to_string_lossy()
                .to_string(),
        }
    }

    /// Blank values leave the current setting untouched.
    pub fn with_overrides(
        mut self,
        endpoint_url: Option<String>,
        transport: Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = endpoint_url.filter(|v| !v.trim().is_empty()) {
            self.endpoint_url = Some(url.trim().to_string());
        }
        if let Some(raw) = transport.filter(|v| !v.trim().is_empty()) {
            self.transport = Transport::parse(&raw)?;
        }
        Ok(self)
    }

    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(TRANSPORT_ENV).ok(),
        )
    }

    /// Endpoint URL when one is actually configured.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

pub fn data_root() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    let root = base.join("quipu");
    fs::create_dir_all(&root).map_err(|source| ConfigError::Write {
        path: root.display().to_string(),
        source,
    })?;
    Ok(root)
}

pub fn settings_path(data_root: &Path) -> PathBuf {
    data_root.join("settings.json")
}

pub fn load_settings(path: &Path, data_root: &Path) -> Result<SurveySettings, ConfigError> {
    if !path.exists() {
        let defaults = SurveySettings::default_for(data_root);
        save_settings(path, &defaults)?;
        return Ok(defaults);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if raw.trim().is_empty() {
        let defaults = SurveySettings::default_for(data_root);
        save_settings(path, &defaults)?;
        return Ok(defaults);
    }
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_settings(path: &Path, settings: &SurveySettings) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let payload = serde_json::to_string_pretty(settings)?;
    fs::write(path, payload).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}
