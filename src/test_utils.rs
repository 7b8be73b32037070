use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

pub fn get_mock_file_system_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("mock_file_system")
}

/// Writes a minimal, fully installed app manifest into `<library>/steamapps`
pub fn write_manifest(path_library: &Path, app_id: &str, name: &str) {
    write_raw_manifest(
        path_library,
        app_id,
        &format!(
            "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"name\"\t\t\"{name}\"\n\t\"StateFlags\"\t\t\"4\"\n\t\"installdir\"\t\t\"{name}\"\n}}\n"
        ),
    );
}

pub fn write_raw_manifest(path_library: &Path, app_id: &str, file_content: &str) {
    let path_steamapps = path_library.join("steamapps");
    fs::create_dir_all(&path_steamapps).unwrap();
    fs::write(
        path_steamapps.join(format!("appmanifest_{app_id}.acf")),
        file_content,
    )
    .unwrap();
}

/// A temporary Steam installation, with the install root at `<tmp>/Steam`
pub struct TestSteam {
    dir: TempDir,
    root: PathBuf,
}

impl TestSteam {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Steam");
        fs::create_dir_all(root.join("steamapps")).unwrap();
        Self { dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates an empty library folder next to the install root
    pub fn library(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(path.join("steamapps")).unwrap();
        path
    }

    pub fn manifest(&self, path_library: &Path, app_id: &str, name: &str) {
        write_manifest(path_library, app_id, name);
    }

    pub fn raw_manifest(&self, path_library: &Path, app_id: &str, file_content: &str) {
        write_raw_manifest(path_library, app_id, file_content);
    }

    /// Writes a `libraryfolders.vdf` listing the given libraries
    pub fn write_index(&self, libraries: &[&Path]) {
        let entries = libraries
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let path = path.to_string_lossy().replace('\\', "\\\\");
                format!("\t\"{i}\"\n\t{{\n\t\t\"path\"\t\t\"{path}\"\n\t\t\"label\"\t\t\"\"\n\t}}\n")
            })
            .collect::<String>();

        fs::write(
            self.root.join("steamapps/libraryfolders.vdf"),
            format!("\"libraryfolders\"\n{{\n{entries}}}\n"),
        )
        .unwrap();
    }
}
