//! Configuration module
//!
//! Attachment options are plain serde structs with documented defaults. They
//! are validated once when loaded and shared immutably afterwards.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::storage_types::StorageBackend;
use crate::template::{PathTemplate, DEFAULT_PATH_TEMPLATE};

/// Reserved style naming the unprocessed upload
pub const ORIGINAL_STYLE: &str = "original";

const DEFAULT_STORAGE: &str = "filesystem";
const DEFAULT_PROTOCOL: &str = "http";

fn default_storage() -> String {
    DEFAULT_STORAGE.to_string()
}

fn default_credentials() -> Value {
    Value::Object(Map::new())
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

fn default_path() -> String {
    DEFAULT_PATH_TEMPLATE.to_string()
}

/// Processing parameters for one named style.
///
/// Keys other than `extension` and `preset` are kept in `extra` for
/// processors that understand them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StyleOptions {
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Declared extension with a leading dot, if one is declared and non-empty.
    pub fn normalized_extension(&self) -> Option<String> {
        self.extension
            .as_deref()
            .map(|ext| ext.trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
    }
}

/// Backend kind plus the opaque credentials the backend understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub kind: String,
    #[serde(default = "default_credentials")]
    pub credentials: Value,
}

impl StorageConfig {
    pub fn new(kind: impl Into<String>, credentials: Value) -> Self {
        Self {
            kind: kind.into(),
            credentials,
        }
    }

    pub fn backend(&self) -> Result<StorageBackend, ConfigurationError> {
        self.kind.parse()
    }

    /// Load storage configuration from the environment (and `.env` if present).
    ///
    /// `STORAGE_BACKEND` selects the kind (default `filesystem`). The local
    /// backend reads `LOCAL_STORAGE_PATH` and `LOCAL_STORAGE_HOST`; the S3
    /// backend reads `S3_BUCKET`, `S3_REGION` (or `AWS_REGION`), `S3_ENDPOINT`,
    /// `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenvy::dotenv().ok();

        let kind = env::var("STORAGE_BACKEND").unwrap_or_else(|_| DEFAULT_STORAGE.to_string());
        let backend: StorageBackend = kind.parse()?;

        let mut credentials = Map::new();
        match backend {
            StorageBackend::Local => {
                let root = env::var("LOCAL_STORAGE_PATH").map_err(|_| {
                    ConfigurationError::Environment("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
                let host = env::var("LOCAL_STORAGE_HOST").map_err(|_| {
                    ConfigurationError::Environment("LOCAL_STORAGE_HOST not configured".to_string())
                })?;
                credentials.insert("root".to_string(), Value::String(root));
                credentials.insert("host".to_string(), Value::String(host));
            }
            StorageBackend::S3 => {
                let bucket = env::var("S3_BUCKET").map_err(|_| {
                    ConfigurationError::Environment("S3_BUCKET not configured".to_string())
                })?;
                let region = env::var("S3_REGION")
                    .or_else(|_| env::var("AWS_REGION"))
                    .map_err(|_| {
                        ConfigurationError::Environment(
                            "S3_REGION or AWS_REGION not configured".to_string(),
                        )
                    })?;
                credentials.insert("bucket".to_string(), Value::String(bucket));
                credentials.insert("region".to_string(), Value::String(region));
                for (var, key) in [
                    ("S3_ENDPOINT", "endpoint"),
                    ("AWS_ACCESS_KEY_ID", "access_key_id"),
                    ("AWS_SECRET_ACCESS_KEY", "secret_access_key"),
                ] {
                    if let Ok(value) = env::var(var) {
                        credentials.insert(key.to_string(), Value::String(value));
                    }
                }
            }
        }

        Ok(Self {
            kind,
            credentials: Value::Object(credentials),
        })
    }
}

/// Options for one attachment field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentOptions {
    /// Storage backend kind (`filesystem` or `s3`)
    #[serde(default = "default_storage")]
    pub storage: String,
    /// Backend-specific credentials blob
    #[serde(default = "default_credentials")]
    pub credentials: Value,
    /// URL scheme used by `Attachment::url`
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Path template, see `PathTemplate`
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub styles: BTreeMap<String, StyleOptions>,
    /// Returned by `Attachment::url` when nothing has been attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_url: Option<String>,
}

impl Default for AttachmentOptions {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            credentials: default_credentials(),
            protocol: default_protocol(),
            path: default_path(),
            styles: BTreeMap::new(),
            default_url: None,
        }
    }
}

impl AttachmentOptions {
    /// Parse options from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage.kind;
        self.credentials = storage.credentials;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_style(mut self, name: impl Into<String>, style: StyleOptions) -> Self {
        self.styles.insert(name.into(), style);
        self
    }

    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.storage_config().backend()?;
        self.path_template()?;

        if self.protocol.trim().is_empty() || self.protocol.contains("://") {
            return Err(ConfigurationError::InvalidOptions(format!(
                "protocol must be a bare scheme, got {:?}",
                self.protocol
            )));
        }

        if self.styles.contains_key(ORIGINAL_STYLE) {
            return Err(ConfigurationError::ReservedStyle(ORIGINAL_STYLE.to_string()));
        }
        if let Some(name) = self.styles.keys().find(|name| name.trim().is_empty()) {
            return Err(ConfigurationError::InvalidOptions(format!(
                "style names must not be blank, got {:?}",
                name
            )));
        }

        Ok(())
    }

    pub fn path_template(&self) -> Result<PathTemplate, ConfigurationError> {
        PathTemplate::parse(&self.path)
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(self.storage.clone(), self.credentials.clone())
    }

    /// Look up a style. `original` resolves to `None`; unconfigured names fail.
    pub fn style(&self, name: &str) -> Result<Option<&StyleOptions>, ConfigurationError> {
        if name == ORIGINAL_STYLE {
            return Ok(None);
        }
        self.styles
            .get(name)
            .map(Some)
            .ok_or_else(|| ConfigurationError::UnknownStyle(name.to_string()))
    }

    /// `original` followed by every configured style in name order.
    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(ORIGINAL_STYLE).chain(self.styles.keys().map(String::as_str))
    }
}
