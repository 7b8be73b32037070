//! A terminal menu for discovering and launching locally installed Steam games.
//!
//! # Description
//!
//! Finds the Steam installation, reads its library index (`libraryfolders.vdf`) and the app
//! manifests (`appmanifest_<id>.acf`) of every library folder, and presents the installed titles
//! as a numbered, alphabetically sorted menu. Choosing a title hands its id to the Steam client,
//! which then starts it.
//!
//! The install root, any library folders added by hand and the account to launch with are
//! remembered in a small JSON settings file.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use steam_menu::{
//!     data::AppId,
//!     launch::{GameLauncher, SteamLauncher},
//!     scan,
//! };
//!
//! let catalog = scan(Path::new("/home/user/.local/share/Steam")).unwrap();
//! for (number, title) in catalog.iter().enumerate() {
//!     println!("{}. {}", number + 1, title.name);
//! }
//!
//! SteamLauncher.launch(&catalog, &AppId::from("620"), None).unwrap();
//! ```
//!
//! # Structure
//!
//! - [`parsers`] - the KeyValues text format used by Steam's `.vdf` and `.acf` files
//! - [`steam`] - install root detection, library discovery and manifest parsing
//! - [`settings`] - loading and saving of the settings file
//! - [`launch`] - starting titles through the Steam client
//! - [`menu`] - key handling and drawing of the interactive menu
//! - [`app`] - the control loop tying everything together

pub mod app;
pub mod data;
pub mod error;
pub mod launch;
mod macros;
pub mod menu;
pub mod parsers;
pub mod settings;
pub mod steam;
mod utils;

#[cfg(test)]
mod test_utils;

pub use steam::{scan, scan_with_libraries};
