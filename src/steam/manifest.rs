use std::{fs::read_to_string, path::Path};

use tracing::{debug, trace};

use super::LAUNCHER;
use crate::{
    data::{AppId, InstallState, Title},
    error::{FieldError, ManifestParseError},
    parsers::parse_key_values,
    utils::clean_game_title,
};

/// Parses the relevant data of a title from the contents of its app manifest file
///
/// `appid` and `name` are required, every other field is optional. A malformed optional field
/// is logged and treated as absent, so a bad `StateFlags` lists the title as
/// [`InstallState::Unknown`].
#[tracing::instrument(level = "trace", skip(file_content))]
pub fn parse_app_manifest(file_content: &str, source: &Path) -> Result<Title, ManifestParseError> {
    let document = parse_key_values(file_content)?;
    let app_state = document
        .root("AppState")
        .ok_or(ManifestParseError::MissingField("AppState"))?;

    // ID
    let id = app_state
        .get_str("appid")
        .map_err(|e| ManifestParseError::malformed("appid", e))?
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ManifestParseError::MissingField("appid"))?;

    // TITLE
    let name = app_state
        .get_str("name")
        .map_err(|e| ManifestParseError::malformed("name", e))?
        .map(clean_game_title)
        .filter(|name| !name.is_empty())
        .ok_or(ManifestParseError::MissingField("name"))?;

    // INSTALL DIR
    let install_dir = optional_field("installdir", app_state.get_str("installdir"))
        .map(str::to_owned);

    // SIZE
    let size_on_disk = optional_field("SizeOnDisk", app_state.get_parsed::<u64>("SizeOnDisk"));

    // STATE
    let state_flags = optional_field("StateFlags", app_state.get_parsed::<u32>("StateFlags"));

    let title = Title {
        id: AppId::from(id),
        name,
        install_dir,
        size_on_disk,
        state: InstallState::from_state_flags(state_flags),
        source: source.to_path_buf(),
    };

    trace!("{LAUNCHER} - Parsed app manifest: {title:?}");

    Ok(title)
}

fn optional_field<T>(field: &str, value: Result<Option<T>, FieldError>) -> Option<T> {
    value.unwrap_or_else(|e| {
        debug!("{LAUNCHER} - Ignoring malformed optional field '{field}': {e}");
        None
    })
}

/// Reads and parses the app manifest file at the given path
pub fn read_app_manifest(path_manifest: &Path, source: &Path) -> Result<Title, ManifestParseError> {
    let file_content = read_to_string(path_manifest)?;
    parse_app_manifest(&file_content, source)
}
