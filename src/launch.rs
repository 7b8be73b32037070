//! Starting titles through the Steam client.
use std::{path::Path, process::Command};

use cfg_if::cfg_if;
use tracing::info;

use crate::{
    data::{AppId, Catalog},
    error::{LaunchCause, LaunchError},
    steam::get_run_uri,
    utils::{detach_stdio, get_launch_command, spawn_detached},
};

/// Something able to start an installed title
pub trait GameLauncher {
    /// Starts the title with the given id, which must be part of `catalog`. Returns as soon as
    /// the external process has been started, without waiting for it.
    fn launch(
        &self,
        catalog: &Catalog,
        id: &AppId,
        account: Option<&str>,
    ) -> Result<(), LaunchError>;
}

/// Launches titles by handing a `steam://rungameid/<id>` URI to the Steam client of the
/// installation the catalog was scanned from
#[derive(Debug, Clone, Copy, Default)]
pub struct SteamLauncher;

fn login_args(account: Option<&str>) -> Vec<&str> {
    account
        .filter(|a| !a.trim().is_empty())
        .map(|a| vec!["-login", a])
        .unwrap_or_default()
}

cfg_if! {
    if #[cfg(target_os = "windows")] {
        fn get_steam_launch_command(install_root: &Path, uri: &str, account: Option<&str>) -> Command {
            if let Some(path_exe) = crate::utils::some_if_file(install_root.join("steam.exe")) {
                let mut command = Command::new(path_exe);
                command.args(login_args(account)).arg(uri);
                command
            } else {
                get_launch_command("cmd", ["/C", "start", "", uri], [])
            }
        }
    } else if #[cfg(target_os = "macos")] {
        fn get_steam_launch_command(_install_root: &Path, uri: &str, account: Option<&str>) -> Command {
            let login = login_args(account);
            if login.is_empty() {
                get_launch_command("open", [uri], [])
            } else {
                let mut command = get_launch_command("open", ["-a", "Steam", "--args"], []);
                command.args(login).arg(uri);
                command
            }
        }
    } else {
        fn get_steam_launch_command(install_root: &Path, uri: &str, account: Option<&str>) -> Command {
            let args = login_args(account).into_iter().chain([uri]);
            if crate::steam::is_flatpak_root(install_root) {
                crate::utils::get_launch_command_flatpak(crate::steam::FLATPAK_APP_ID, [], args, [])
            } else {
                get_launch_command("steam", args, [])
            }
        }
    }
}

impl SteamLauncher {
    /// Command which asks the Steam client at `install_root` to start the given title
    pub fn get_launch_command(install_root: &Path, id: &AppId, account: Option<&str>) -> Command {
        get_steam_launch_command(install_root, &get_run_uri(id), account)
    }
}

impl GameLauncher for SteamLauncher {
    #[tracing::instrument(level = "trace", skip(catalog))]
    fn launch(
        &self,
        catalog: &Catalog,
        id: &AppId,
        account: Option<&str>,
    ) -> Result<(), LaunchError> {
        let failed = |cause| LaunchError::LaunchFailed {
            id: id.clone(),
            cause,
        };

        let Some(title) = catalog.get(id) else {
            return Err(failed(LaunchCause::UnknownTitle));
        };

        let mut command = Self::get_launch_command(catalog.install_root(), id, account);
        detach_stdio(&mut command);
        info!("Launching '{}' ({id}): {command:?}", title.name);

        // Steam takes over from here, the reaper thread is never joined
        spawn_detached(&mut command)
            .map(drop)
            .map_err(|e| failed(LaunchCause::Spawn(e)))
    }
}
