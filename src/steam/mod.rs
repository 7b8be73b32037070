//! Discovery of Steam libraries and the titles installed in them.
//!
//! PATHS:
//! - `<root>/steamapps/libraryfolders.vdf` - index of additional library folders
//! - `<library>/steamapps/appmanifest_<id>.acf` - one manifest per installed title
//! - `<root>/config/loginusers.vdf` - accounts which have logged in on this machine
mod accounts;
mod library;
mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use cfg_if::cfg_if;
use itertools::Itertools;

pub use accounts::{get_accounts, parse_login_users};
pub use library::{get_library_index_path, parse_library_index, read_library_index};
pub use manifest::{parse_app_manifest, read_app_manifest};
pub use scanner::{discover_library_folders, merge_titles, scan, scan_with_libraries};

use crate::{macros::logs::debug_path, utils::path_identity};

pub(crate) const LAUNCHER: &str = "Steam";

pub const FLATPAK_APP_ID: &str = "com.valvesoftware.Steam";

/// URI understood by the Steam client for starting a title
pub fn get_run_uri(app_id: impl std::fmt::Display) -> String {
    format!("steam://rungameid/{app_id}")
}

pub fn get_steam_flatpak_dir(path_home: &Path) -> PathBuf {
    path_home.join(".var/app/com.valvesoftware.Steam/data/Steam")
}

/// Whether the given install root belongs to the flatpak version of Steam
pub fn is_flatpak_root(install_root: &Path) -> bool {
    dirs::home_dir().is_some_and(|home| {
        path_identity(install_root).starts_with(path_identity(&get_steam_flatpak_dir(&home)))
    }) || install_root
        .components()
        .any(|c| c.as_os_str() == FLATPAK_APP_ID)
}

cfg_if! {
    if #[cfg(target_os = "windows")] {
        /// Locations where Steam is commonly installed on this platform, in order of preference
        pub fn install_root_candidates() -> Vec<PathBuf> {
            let mut candidates = vec![
                PathBuf::from(r"C:\Program Files (x86)\Steam"),
                PathBuf::from(r"C:\Program Files\Steam"),
            ];
            for drive in 'C'..='Z' {
                candidates.push(PathBuf::from(format!(r"{drive}:\Steam")));
                candidates.push(PathBuf::from(format!(r"{drive}:\Program Files (x86)\Steam")));
                candidates.push(PathBuf::from(format!(r"{drive}:\Program Files\Steam")));
            }
            candidates
        }
    } else if #[cfg(target_os = "macos")] {
        /// Locations where Steam is commonly installed on this platform, in order of preference
        pub fn install_root_candidates() -> Vec<PathBuf> {
            dirs::data_dir()
                .map(|p| vec![p.join("Steam")])
                .unwrap_or_default()
        }
    } else {
        /// Locations where Steam is commonly installed on this platform, in order of preference
        pub fn install_root_candidates() -> Vec<PathBuf> {
            let mut candidates = Vec::new();
            if let Some(path_data) = dirs::data_dir() {
                candidates.push(path_data.join("Steam"));
            }
            if let Some(path_home) = dirs::home_dir() {
                candidates.push(path_home.join(".steam/steam"));
                candidates.push(path_home.join(".steam/root"));
                candidates.push(get_steam_flatpak_dir(&path_home));
            }
            candidates
        }
    }
}

/// Returns the Steam install roots which actually exist on this system, without duplicates
/// (e.g. `~/.steam/steam` is normally a symlink to `~/.local/share/Steam`)
#[tracing::instrument(level = "trace")]
pub fn detect_install_roots() -> Vec<PathBuf> {
    install_root_candidates()
        .into_iter()
        .filter(|path| {
            let path_steamapps = path.join("steamapps");
            debug_path!("steamapps directory", path_steamapps);
            path_steamapps.is_dir()
        })
        .unique_by(|path| path_identity(path))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_run_uri() {
        assert_eq!(get_run_uri("1091500"), "steam://rungameid/1091500");
    }

    #[test]
    fn test_is_flatpak_root() {
        assert!(is_flatpak_root(Path::new(
            "/home/user/.var/app/com.valvesoftware.Steam/data/Steam"
        )));
        assert!(!is_flatpak_root(Path::new("/opt/games/Steam")));
    }

    #[test]
    fn test_detected_roots_exist() {
        for root in detect_install_roots() {
            assert!(root.join("steamapps").is_dir());
        }
    }
}
