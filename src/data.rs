use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::utils::some_if_dir;

/// Identifier of an installed title, as found in its manifest (`appid`)
///
/// Kept opaque: Steam ids are numeric, but nothing here relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AppId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_owned())
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// Install state as recorded by the `StateFlags` field of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallState {
    /// `StateFlags` contains the fully installed bit
    FullyInstalled,
    /// `StateFlags` is present, but without the fully installed bit (e.g. first download)
    Incomplete(u32),
    /// No `StateFlags` field was present
    Unknown,
}

impl InstallState {
    const FLAG_FULLY_INSTALLED: u32 = 4;

    pub fn from_state_flags(flags: Option<u32>) -> Self {
        match flags {
            Some(f) if f & Self::FLAG_FULLY_INSTALLED != 0 => Self::FullyInstalled,
            Some(f) => Self::Incomplete(f),
            None => Self::Unknown,
        }
    }

    /// Whether a title in this state should be listed in the catalog
    pub fn is_listed(&self) -> bool {
        !matches!(self, Self::Incomplete(_))
    }
}

/// A directory containing installed titles (`<folder>/steamapps/appmanifest_*.acf`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryFolder {
    pub path: PathBuf,
}

impl LibraryFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory which holds the manifest files for this library
    ///
    /// Normally the `steamapps` sub-directory, but a folder which was given as the `steamapps`
    /// directory itself is used as-is.
    pub fn manifest_dir(&self) -> PathBuf {
        some_if_dir(self.path.join("steamapps")).unwrap_or_else(|| self.path.clone())
    }
}

/// Data structure which defines all relevant data about an installed title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub id: AppId,
    pub name: String,
    pub install_dir: Option<String>,
    pub size_on_disk: Option<u64>,
    pub state: InstallState,
    /// Library folder this title was found in
    pub source: PathBuf,
}

impl Title {
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// De-duplicated, sorted list of installed titles from every scanned library folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    install_root: PathBuf,
    titles: Vec<Title>,
    folders: Vec<LibraryFolder>,
}

impl Catalog {
    pub(crate) fn new(install_root: PathBuf, titles: Vec<Title>, folders: Vec<LibraryFolder>) -> Self {
        Self {
            install_root,
            titles,
            folders,
        }
    }

    /// Install root this catalog was scanned from
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    pub fn titles(&self) -> &[Title] {
        &self.titles
    }

    /// Library folders which were scanned to build this catalog, in precedence order
    pub fn folders(&self) -> &[LibraryFolder] {
        &self.folders
    }

    pub fn get(&self, id: &AppId) -> Option<&Title> {
        self.titles.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Title> {
        self.titles.iter()
    }
}

/// A Steam account which has logged in on this machine (`config/loginusers.vdf`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub steam_id: String,
    pub account_name: String,
    pub persona_name: Option<String>,
    pub most_recent: bool,
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.persona_name {
            Some(persona) if persona != &self.account_name => {
                write!(f, "{persona} ({})", self.account_name)
            }
            _ => f.write_str(&self.account_name),
        }
    }
}
