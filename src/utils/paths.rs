use std::path::{Path, PathBuf};

/// Returns an Option containing the given `PathBuf`, if the `PathBuf` points to an actual file
pub fn some_if_file(path: PathBuf) -> Option<PathBuf> {
    path.is_file().then_some(path)
}

/// Returns an Option containing the given `PathBuf`, if the `PathBuf` points to an actual directory
pub fn some_if_dir(path: PathBuf) -> Option<PathBuf> {
    path.is_dir().then_some(path)
}

/// Key used to compare two paths which may be spelled differently but point to the same
/// directory. Falls back to the path as given if it cannot be canonicalised.
pub fn path_identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Normalises a path typed in by the user: surrounding whitespace and quotes are removed, and
/// a leading `~` is expanded to the home directory
pub fn clean_user_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim().trim_matches(['"', '\'']).trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            let rest = rest.trim_start_matches(['/', '\\']);
            return Some(if rest.is_empty() { home } else { home.join(rest) });
        }
    }

    Some(PathBuf::from(trimmed))
}
