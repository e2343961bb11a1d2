//! Client configuration: service location, batch limit and cache policy.
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! service_url = "https://diretto.example.org/v2/task"
//! max_task_request_size = 50
//!
//! [cache]
//! activated = true
//! time_to_live_secs = 300
//! max_entries = 1000
//! ```
//!
//! When `max_task_request_size` is omitted the gateway asks the service for
//! its batch limit on connect.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::TimeDelta;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::task::adapters::memory::CacheRetention;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The path does not name a file.
    #[error("configuration path has no file name: {0}")]
    NotAFile(Utf8PathBuf),

    /// The document is not valid TOML for this configuration.
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    /// The service URL uses a scheme other than `http` or `https`.
    #[error("unsupported service URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The service URL cannot carry resource paths.
    #[error("service URL cannot be a base: {0}")]
    NotABase(Url),

    /// A configured batch limit of zero.
    #[error("max_task_request_size must be greater than zero")]
    ZeroBatchLimit,

    /// A configured cache capacity of zero.
    #[error("cache.max_entries must be greater than zero")]
    ZeroCacheCapacity,

    /// A cache expiry of zero or beyond the representable range.
    #[error("cache.time_to_live_secs is out of range: {0}")]
    InvalidTimeToLive(u64),
}

/// Entity cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Whether tasks are cached at all.
    pub activated: bool,
    /// Seconds after which a cached task is treated as absent.
    pub time_to_live_secs: Option<u64>,
    /// Largest number of cached tasks.
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            activated: true,
            time_to_live_secs: None,
            max_entries: None,
        }
    }
}

impl CacheConfig {
    /// Returns a configuration with caching switched off.
    #[must_use]
    pub const fn deactivated() -> Self {
        Self {
            activated: false,
            time_to_live_secs: None,
            max_entries: None,
        }
    }

    /// Returns the retention rules for the in-memory cache.
    ///
    /// An expiry outside the representable range is dropped; [`Self::validate`]
    /// rejects such values up front.
    #[must_use]
    pub fn retention(&self) -> CacheRetention {
        CacheRetention {
            time_to_live: self.time_to_live_secs.and_then(time_to_live),
            max_entries: self.max_entries,
        }
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCacheCapacity`] or
    /// [`ConfigError::InvalidTimeToLive`] for unusable bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == Some(0) {
            return Err(ConfigError::ZeroCacheCapacity);
        }
        if let Some(secs) = self.time_to_live_secs {
            if secs == 0 || time_to_live(secs).is_none() {
                return Err(ConfigError::InvalidTimeToLive(secs));
            }
        }
        Ok(())
    }
}

fn time_to_live(secs: u64) -> Option<TimeDelta> {
    i64::try_from(secs).ok().and_then(TimeDelta::try_seconds)
}

/// Settings for one task client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Root of the Task API.
    pub service_url: Url,
    /// Largest batched lookup; discovered from the service when absent.
    #[serde(default)]
    pub max_task_request_size: Option<usize>,
    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl ClientConfig {
    /// Creates a configuration with default cache settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `service_url` is unusable.
    pub fn new(service_url: Url) -> Result<Self, ConfigError> {
        Self {
            service_url,
            max_task_request_size: None,
            cache: CacheConfig::default(),
        }
        .validated()
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed documents and the
    /// validation errors of [`Self::validated`].
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(document)?;
        config.validated()
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, plus the
    /// errors of [`Self::from_toml_str`].
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| ConfigError::NotAFile(path.to_owned()))?;
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let read_error = |source| ConfigError::Read {
            path: path.to_owned(),
            source,
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let document = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_toml_str(&document)
    }

    /// Sets a fixed batch limit.
    #[must_use]
    pub const fn with_max_task_request_size(mut self, limit: usize) -> Self {
        self.max_task_request_size = Some(limit);
        self
    }

    /// Replaces the cache settings.
    #[must_use]
    pub const fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Validates the settings and normalises the service URL so that
    /// resource paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedScheme`], [`ConfigError::NotABase`],
    /// [`ConfigError::ZeroBatchLimit`] or the errors of
    /// [`CacheConfig::validate`].
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        match self.service_url.scheme() {
            "http" | "https" => {}
            other => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
        }
        if self.service_url.cannot_be_a_base() {
            return Err(ConfigError::NotABase(self.service_url));
        }
        if !self.service_url.path().ends_with('/') {
            let path = format!("{}/", self.service_url.path());
            self.service_url.set_path(&path);
        }
        if self.max_task_request_size == Some(0) {
            return Err(ConfigError::ZeroBatchLimit);
        }
        self.cache.validate()?;
        Ok(self)
    }
}
