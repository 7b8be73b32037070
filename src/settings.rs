//! Persistence of the user's settings in a small JSON file.
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{error::SettingsError, utils::path_identity};

const SETTINGS_DIR_NAME: &str = "steam-menu";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Everything remembered between sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Base directory of the Steam installation
    pub install_root: Option<PathBuf>,
    /// Account passed to Steam when launching a title
    pub last_account: Option<String>,
    /// Library folders added by hand, scanned after those known to Steam
    pub extra_libraries: Vec<PathBuf>,
}

impl Settings {
    /// Adds a library folder, unless it is already present. Returns whether it was added.
    pub fn add_library(&mut self, path: PathBuf) -> bool {
        let identity = path_identity(&path);
        if self
            .extra_libraries
            .iter()
            .any(|p| path_identity(p) == identity)
        {
            return false;
        }

        self.extra_libraries.push(path);
        true
    }

    pub fn remove_library(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.extra_libraries.len()).then(|| self.extra_libraries.remove(index))
    }
}

/// Loads and saves [`Settings`] at a fixed location
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/steam-menu/settings.json`, if a config directory exists for this user
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` if no settings have been saved yet
    pub fn try_load(&self) -> Result<Option<Settings>, SettingsError> {
        let file_content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&file_content)?))
    }

    /// Loads the settings. Missing, unreadable and corrupt settings are all treated as absent.
    #[tracing::instrument(level = "trace")]
    pub fn load(&self) -> Option<Settings> {
        match self.try_load() {
            Ok(Some(settings)) => {
                debug!("Loaded settings from {:?}: {settings:?}", self.path);
                Some(settings)
            }
            Ok(None) => {
                debug!("No settings file at {:?}", self.path);
                None
            }
            Err(e) => {
                warn!("Ignoring settings at {:?}: {e}", self.path);
                None
            }
        }
    }

    /// Writes the settings, replacing the file in one step so that an interrupted write never
    /// leaves a truncated file behind
    #[tracing::instrument(level = "trace")]
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut path_tmp = self.path.clone().into_os_string();
        path_tmp.push(".tmp");
        let path_tmp = PathBuf::from(path_tmp);

        let written = write_settings(&path_tmp, settings)
            .and_then(|()| fs::rename(&path_tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&path_tmp);
            return Err(e.into());
        }
        debug!("Saved settings to {:?}", self.path);

        Ok(())
    }
}

fn write_settings(path: &Path, settings: &Settings) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, settings)?;
    file.write_all(b"\n")?;
    file.sync_all()
}
