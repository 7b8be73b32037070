use std::{
    fs,
    path::{Path, PathBuf},
};

use pretty_assertions::assert_eq;
use steam_menu::{
    data::{AppId, InstallState},
    error::{LaunchCause, LaunchError, ScanError},
    launch::{GameLauncher, SteamLauncher},
    scan, scan_with_libraries,
    settings::{Settings, SettingsStore},
};
use tempfile::TempDir;

fn mock_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("mock_file_system/Steam")
}

fn write_manifest(path_library: &Path, app_id: &str, name: &str) {
    let path_steamapps = path_library.join("steamapps");
    fs::create_dir_all(&path_steamapps).unwrap();
    fs::write(
        path_steamapps.join(format!("appmanifest_{app_id}.acf")),
        format!("\"AppState\"\n{{\n\t\"appid\"\t\"{app_id}\"\n\t\"name\"\t\"{name}\"\n\t\"StateFlags\"\t\"4\"\n}}\n"),
    )
    .unwrap();
}

#[test]
fn test_scan_mock_installation() -> Result<(), ScanError> {
    let catalog = scan(&mock_root())?;

    let names = catalog.iter().map(|t| t.name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        ["Counter-Strike 2", "Half-Life 2", "Portal 2", "Terraria"]
    );

    let terraria = catalog.get(&AppId::from("105600")).unwrap();
    assert_eq!(terraria.install_dir.as_deref(), Some("Terraria"));
    assert_eq!(terraria.state, InstallState::FullyInstalled);

    // The library listed in the index does not exist
    assert_eq!(catalog.folders().len(), 1);

    Ok(())
}

#[test]
fn test_scan_with_extra_library_from_settings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("Steam");
    let extra = dir.path().join("Games");
    write_manifest(&root, "10", "zeta");
    write_manifest(&extra, "20", "Alpha");
    write_manifest(&extra, "10", "Zeta copy");

    let store = SettingsStore::new(dir.path().join("config/settings.json"));
    store
        .save(&Settings {
            install_root: Some(root.clone()),
            last_account: None,
            extra_libraries: vec![extra],
        })
        .unwrap();
    let settings = store.load().unwrap();

    let catalog = scan_with_libraries(
        settings.install_root.as_deref().unwrap(),
        &settings.extra_libraries,
    )
    .unwrap();

    let titles = catalog
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(titles, [("20", "Alpha"), ("10", "zeta")]);
}

#[test]
fn test_scan_invalid_root() {
    let dir = TempDir::new().unwrap();

    assert!(matches!(
        scan(&dir.path().join("missing")),
        Err(ScanError::InvalidRoot { .. })
    ));
}

#[test]
fn test_launch_unknown_title() {
    let catalog = scan(&mock_root()).unwrap();

    let result = SteamLauncher.launch(&catalog, &AppId::from("999"), Some("gaben"));

    match result {
        Err(LaunchError::LaunchFailed { id, cause }) => {
            assert_eq!(id, AppId::from("999"));
            assert!(matches!(cause, LaunchCause::UnknownTitle));
        }
        other => panic!("Expected a failed launch, got {other:?}"),
    }
}
