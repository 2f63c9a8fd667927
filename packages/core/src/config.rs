use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use crate::error::{Error, Result};

/// Tool-wide settings, persisted as TOML under the strawbrew home directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory that holds one subdirectory per installed Perl.
    pub root_dir: PathBuf,
    /// Archive cache directory; downloaded zips live here between installs.
    pub temp_dir: PathBuf,
    /// Base URL of the Strawberry Perl release site.
    pub download_url: String,
    /// Whether `exec` also runs against custom (cloned) Perls.
    pub custom_exec: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let home = strawbrew_home();
        Self {
            root_dir: home.join("perls"),
            temp_dir: home.join("temp"),
            download_url: "https://strawberryperl.com/download".to_string(),
            custom_exec: false,
        }
    }
}

/// The strawbrew home directory (`~/.strawbrew`), without creating it.
pub fn strawbrew_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".strawbrew")
}

impl Settings {
    /// Load settings from `<dir>/config.toml`. Returns defaults if the file
    /// doesn't exist; a present-but-unparseable file is an error, not an
    /// empty value.
    pub fn load(dir: &std::path::Path) -> Result<Self> {
        let path = dir.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::io("Failed to read settings", &path, e))?;

        toml::from_str(&content).map_err(|e| Error::ConfigMalformed {
            path,
            detail: e.to_string(),
        })
    }

    /// Save settings to `<dir>/config.toml`, creating the directory if needed.
    pub fn save(&self, dir: &std::path::Path) -> Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .map_err(|e| Error::io("Failed to create config dir", dir, e))?;
        }

        let path = dir.join("config.toml");
        let content = toml::to_string_pretty(self).map_err(|e| Error::ConfigMalformed {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        fs::write(&path, content).map_err(|e| Error::io("Failed to write settings", &path, e))
    }

    /// Ensure the Perl install root exists. Failure is advisory: the user is
    /// told to create it manually and run `config` again.
    pub fn check_root_dir(&self) {
        if !self.root_dir.exists() {
            if let Err(e) = fs::create_dir_all(&self.root_dir) {
                warn!(dir = %self.root_dir.display(), error = %e, "could not create install dir");
                eprintln!(
                    "\nCouldn't create install dir {}. Please create it manually and run config again",
                    self.root_dir.display()
                );
            }
        }
    }
}
