//! Layered configuration for coview.
//!
//! Values are merged from, in increasing priority:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A config file: the one passed on the command line, or `config.{toml,yaml,yml,json}`
//!    in the platform config directory if present
//! 3. Environment variables prefixed with `COVIEW_`, using `__` for nesting
//!    (`COVIEW_DATA__DIR=/srv/comics`, `COVIEW_UPLOAD__MAX_SIZE=0`)

pub mod error;

use crate::error::{ErrorKind, Result};
use coview_archive::{DEFAULT_MEDIA_EXTENSIONS, MediaFilter};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "COVIEW_";
const CONFIG_FILE_STEM: &str = "config";
const CONFIG_FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];
const DEFAULT_UPLOAD_LIMIT: u64 = 100 * 1024 * 1024;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "coview")
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub media: MediaConfig,
    pub upload: UploadConfig,
}

/// The watched archive directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Relative paths resolve against the current working directory.
    pub dir: PathBuf,
    /// Drop uploads (with a log line) instead of writing them.
    pub read_only: bool,
}
impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("data"), read_only: false }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub dir: PathBuf,
    /// Used when `dir` can't be created or written to.
    pub fallback_dir: PathBuf,
}
impl Default for CacheConfig {
    fn default() -> Self {
        let fallback_dir = project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("coview-cache-fallback"));
        Self { dir: std::env::temp_dir().join("coview-cache"), fallback_dir }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Entry extensions that count as pages.
    pub extensions: Vec<String>,
}
impl Default for MediaConfig {
    fn default() -> Self {
        Self { extensions: DEFAULT_MEDIA_EXTENSIONS.iter().map(|ext| ext.to_string()).collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Byte limit for a single upload. `null` or `0` disables the limit.
    pub max_size: Option<u64>,
}
impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_size: Some(DEFAULT_UPLOAD_LIMIT) }
    }
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// used if there is one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::Missing(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "Loading config file");
        }
        Self::extract(Self::figment(file.as_deref())?)
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
                Some("json") => figment.merge(Json::file_exact(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.media_filter().extensions().is_empty() {
            tracing::error!("media.extensions must list at least one extension");
            exn::bail!(ErrorKind::Invalid);
        }
        if self.data.dir.as_os_str().is_empty() {
            tracing::error!("data.dir must not be empty");
            exn::bail!(ErrorKind::Invalid);
        }
        Ok(())
    }

    /// The watched directory as an absolute path.
    pub fn data_dir(&self) -> Result<PathBuf> {
        std::path::absolute(&self.data.dir).or_raise(|| ErrorKind::Invalid)
    }

    pub fn media_filter(&self) -> MediaFilter {
        MediaFilter::new(&self.media.extensions)
    }

    /// Upload byte limit, `None` when unlimited.
    pub fn upload_limit(&self) -> Option<u64> {
        self.upload.max_size.filter(|&limit| limit > 0)
    }
}

/// First existing `config.*` file in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let dirs = project_dirs()?;
    CONFIG_FILE_EXTENSIONS
        .iter()
        .map(|ext| dirs.config_dir().join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file())
}
