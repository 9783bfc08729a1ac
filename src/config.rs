//! User config file handling.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Context;
use serde::Deserialize;

use crate::convert::{CaseMode, OutputForm};

const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");

/// Path to the user config file: `$HOME/.config/code-rename.toml`
///
/// Returns `None` if the home directory cannot be determined.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(home_dir.join(".config").join(format!("{PROJECT_NAME}.toml")))
});

/// Default catalog location: `$HOME/.config/code-rename/country_mappings.json`
pub static DEFAULT_CATALOG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let home_dir = dirs::home_dir()?;
    Some(
        home_dir
            .join(".config")
            .join(PROJECT_NAME)
            .join("country_mappings.json"),
    )
});

/// Get the user config file path if the home directory is known.
#[must_use]
pub fn config_path() -> Option<&'static PathBuf> {
    CONFIG_PATH.as_ref()
}

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct CodeRenameConfig {
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<OutputForm>,
    #[serde(default)]
    pub case: Option<CaseMode>,
    #[serde(default)]
    pub replace_spaces: bool,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub log: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    code_rename: CodeRenameConfig,
}

impl CodeRenameConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut config = toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.code_rename)
            .context("Failed to parse code_rename config TOML")?;
        config.catalog = config.catalog.map(|path| expand_home(&path));
        Ok(config)
    }
}

/// Replace a leading `~` with the home directory.
/// Paths without it, or with an unknown home directory, are returned as is.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}
