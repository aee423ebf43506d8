/// Application settings
///
/// Settings live in a JSON file in the user's config directory:
/// - Linux: ~/.config/fit-composer/settings.json
/// - macOS: ~/Library/Application Support/fit-composer/settings.json
/// - Windows: %APPDATA%\fit-composer\settings.json
///
/// Every field has a default, so a partial file (or no file at all) is valid.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FitError, FitResult};

const APP_DIR: &str = "fit-composer";

/// Default upload limit for images (4 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 4 * 1024 * 1024;

/// One entry of the uploader's permitted-type configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PermittedType {
    /// Human-readable kind, used as the file dialog filter name
    pub kind: String,
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    /// Largest accepted file in bytes
    pub max_file_size: u64,
}

impl PermittedType {
    pub fn image() -> Self {
        Self {
            kind: "image".to_string(),
            extensions: ["png", "jpg", "jpeg", "gif", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_size: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// File types the uploader accepts
    pub permitted_types: Vec<PermittedType>,
    /// Block submission until an image has been uploaded
    pub require_image: bool,
    /// Route requested after a successful submission
    pub profile_route: String,
    /// Where uploaded images are stored (defaults to the data dir)
    pub media_dir: Option<PathBuf>,
    /// Catalog database location (defaults to the data dir)
    pub database_path: Option<PathBuf>,
    /// Fallback `tracing` filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            permitted_types: vec![PermittedType::image()],
            require_image: false,
            profile_route: "/profile".to_string(),
            media_dir: None,
            database_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, or defaults if absent
    pub fn load() -> FitResult<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> FitResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> FitResult<()> {
        if self.permitted_types.is_empty() {
            return Err(FitError::config("permitted_types must not be empty"));
        }
        if !self.profile_route.starts_with('/') {
            return Err(FitError::config(format!(
                "profile_route must be an absolute path, got {:?}",
                self.profile_route
            )));
        }
        Ok(())
    }

    fn settings_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push(APP_DIR);
        path.push("settings.json");
        Some(path)
    }

    /// Resolved media directory for uploaded images
    pub fn media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("media"))
    }

    /// Resolved catalog database path
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| data_dir().join("fits.db"))
    }
}

/// Per-user data directory, falling back to the home dir and then the cwd
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
