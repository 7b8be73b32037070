use std::{
    fs::read_to_string,
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::{LAUNCHER, read_app_manifest};
use crate::{
    data::{LibraryFolder, Title},
    error::{LibraryFolderError, ManifestParseError},
    macros::logs::{warn_no_games, warn_skipped_manifest},
    parsers::{KeyValue, parse_key_values, parse_manifest_filename},
};

pub fn get_library_index_path(install_root: &Path) -> PathBuf {
    install_root.join("steamapps/libraryfolders.vdf")
}

/// Parses the library paths listed in a `libraryfolders.vdf` file, in the order they are listed
///
/// Supports both the current format, where each numbered entry is a block containing a `path`,
/// and the legacy format, where each numbered entry is the path itself. Entries with
/// non-numeric keys (e.g. `TimeNextStatsReport`, `contentstatsid`) are ignored.
pub fn parse_library_index(file_content: &str) -> Result<Vec<PathBuf>, ManifestParseError> {
    let document = parse_key_values(file_content)?;
    let Some(library_folders) = document.root("libraryfolders") else {
        return Ok(Vec::new());
    };

    Ok(library_folders
        .entries()
        .filter(|(key, _)| key.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|(key, value)| {
            let path = match value {
                KeyValue::Str(path) => Some(path.as_str()),
                KeyValue::Block(block) => block.get_str("path").ok().flatten(),
            };
            if path.is_none() {
                debug!("{LAUNCHER} - Library index entry '{key}' has no path");
            }
            path
        })
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Reads the library index under the install root. A missing index means the install root is
/// the only library, and an unparseable one is treated the same way.
#[tracing::instrument(level = "trace")]
pub fn read_library_index(install_root: &Path) -> Vec<PathBuf> {
    let path_index = get_library_index_path(install_root);

    let file_content = match read_to_string(&path_index) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{LAUNCHER} - No library index at {path_index:?}");
            return Vec::new();
        }
        Err(e) => {
            warn!("{LAUNCHER} - Could not read library index at {path_index:?}: {e}");
            return Vec::new();
        }
    };

    parse_library_index(&file_content).unwrap_or_else(|e| {
        warn!("{LAUNCHER} - Could not parse library index at {path_index:?}: {e}");
        Vec::new()
    })
}

impl LibraryFolder {
    /// Checks that this library folder can be scanned
    pub fn check(&self) -> Result<(), LibraryFolderError> {
        if !self.path.is_dir() {
            return Err(LibraryFolderError::Missing {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// Find and return paths of the app manifest files, sorted by file name
    #[tracing::instrument(level = "trace")]
    pub fn get_manifest_paths(&self) -> Result<Vec<PathBuf>, LibraryFolderError> {
        self.check()?;
        let path_manifest_dir = self.manifest_dir();

        let mut paths = Vec::new();
        for entry in WalkDir::new(&path_manifest_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(LibraryFolderError::Unreadable {
                        path: path_manifest_dir,
                        source: e.into(),
                    });
                }
                Err(e) => {
                    debug!("{LAUNCHER} - Could not read directory entry: {e}");
                    continue;
                }
            };

            let Some(filename) = entry.file_name().to_str() else {
                debug!(
                    "{LAUNCHER} - Could not convert OS string to str: {:?}",
                    entry.file_name()
                );
                continue;
            };

            if parse_manifest_filename(filename).is_err() {
                trace!(
                    "{LAUNCHER} - File skipped as it did not match the pattern of a manifest file: {filename}"
                );
                continue;
            }

            if !entry.file_type().is_file() && !entry.path().is_file() {
                trace!("{LAUNCHER} - Skipped manifest name which is not a file: {filename}");
                continue;
            }

            paths.push(entry.into_path());
        }

        Ok(paths)
    }

    /// Get all titles installed in this library. Manifests which cannot be parsed are logged and
    /// skipped, as are titles which are not fully installed.
    #[tracing::instrument(level = "trace")]
    pub fn get_titles(&self) -> Result<Vec<Title>, LibraryFolderError> {
        let manifest_paths = self.get_manifest_paths()?;

        if manifest_paths.is_empty() {
            warn_no_games!(self.path);
        }

        Ok(manifest_paths
            .iter()
            .filter_map(|path| match read_app_manifest(path, &self.path) {
                Ok(title) if title.state.is_listed() => Some(title),
                Ok(title) => {
                    debug!(
                        "{LAUNCHER} - Skipped '{}' as it is not fully installed: {:?}",
                        title.name, title.state
                    );
                    None
                }
                Err(e) => {
                    warn_skipped_manifest!(path, e);
                    None
                }
            })
            .collect())
    }
}
