use std::{
    fs::read_dir,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use tracing::{debug, info, warn};

use super::{LAUNCHER, read_library_index};
use crate::{
    data::{Catalog, LibraryFolder, Title},
    error::ScanError,
    macros::logs::debug_path,
    utils::path_identity,
};

fn validate_install_root(install_root: &Path) -> Result<(), ScanError> {
    debug_path!("install root", install_root);

    let invalid = |reason: String| ScanError::InvalidRoot {
        path: install_root.to_path_buf(),
        reason,
    };

    if !install_root.exists() {
        return Err(invalid("path does not exist".into()));
    }
    if !install_root.is_dir() {
        return Err(invalid("path is not a directory".into()));
    }
    read_dir(install_root).map_err(|e| invalid(format!("directory cannot be read: {e}")))?;

    Ok(())
}

/// Builds the ordered set of library folders to scan: the install root first, then every
/// library from the index in the order listed, then any extra libraries. Folders which do not
/// exist are logged and left out, and duplicates keep their first position.
#[tracing::instrument(level = "trace")]
pub fn discover_library_folders(
    install_root: &Path,
    extra_libraries: &[PathBuf],
) -> Vec<LibraryFolder> {
    std::iter::once(install_root.to_path_buf())
        .chain(read_library_index(install_root))
        .chain(extra_libraries.iter().cloned())
        .map(LibraryFolder::new)
        .filter(|library| match library.check() {
            Ok(()) => true,
            Err(e) => {
                warn!("{LAUNCHER} - Skipping library folder: {e}");
                false
            }
        })
        .unique_by(|library| path_identity(&library.path))
        .collect()
}

/// Merges titles from every library folder into a single catalog ordering
///
/// Folders must be given in precedence order: when an id appears more than once, the title from
/// the earliest folder is kept as-is. The result is sorted by name, case-insensitively, with
/// the id as a tie-breaker so that the order is fully deterministic.
pub fn merge_titles(titles_per_folder: impl IntoIterator<Item = Vec<Title>>) -> Vec<Title> {
    titles_per_folder
        .into_iter()
        .flatten()
        .unique_by(|title| title.id.clone())
        .sorted_by_cached_key(|title| (title.name.to_lowercase(), title.id.clone()))
        .collect()
}

/// Scans the Steam installation at `install_root` and all of its library folders
///
/// Fails only if the install root itself is unusable; problems with individual library
/// folders or manifests are logged and skipped.
pub fn scan(install_root: &Path) -> Result<Catalog, ScanError> {
    scan_with_libraries(install_root, &[])
}

/// Same as [`scan`], additionally scanning the given library folders after those listed in the
/// library index
#[tracing::instrument(level = "trace")]
pub fn scan_with_libraries(
    install_root: &Path,
    extra_libraries: &[PathBuf],
) -> Result<Catalog, ScanError> {
    validate_install_root(install_root)?;

    let folders = discover_library_folders(install_root, extra_libraries);
    debug!("{LAUNCHER} - Library folders detected: {folders:?}");

    let titles_per_folder = folders
        .iter()
        .filter_map(|library| match library.get_titles() {
            Ok(titles) => Some(titles),
            Err(e) => {
                warn!("{LAUNCHER} - Skipping library folder: {e}");
                None
            }
        })
        .collect::<Vec<_>>();

    let titles = merge_titles(titles_per_folder);
    info!(
        "{LAUNCHER} - Found {} titles across {} library folders",
        titles.len(),
        folders.len()
    );

    Ok(Catalog::new(install_root.to_path_buf(), titles, folders))
}
