use std::{fs::read_to_string, path::Path};

use itertools::Itertools;
use tracing::{debug, warn};

use super::LAUNCHER;
use crate::{
    data::Account,
    error::ManifestParseError,
    parsers::{KeyValue, parse_key_values},
};

/// Parses the accounts listed in a `loginusers.vdf` file, most recently used first
pub fn parse_login_users(file_content: &str) -> Result<Vec<Account>, ManifestParseError> {
    let document = parse_key_values(file_content)?;
    let Some(users) = document.root("users") else {
        return Ok(Vec::new());
    };

    Ok(users
        .entries()
        .filter_map(|(steam_id, value)| {
            let KeyValue::Block(user) = value else {
                return None;
            };

            let Some(account_name) = user.get_str("AccountName").ok().flatten() else {
                debug!("{LAUNCHER} - Skipped user without an account name: {steam_id}");
                return None;
            };

            Some(Account {
                steam_id: steam_id.to_owned(),
                account_name: account_name.to_owned(),
                persona_name: user
                    .get_str("PersonaName")
                    .ok()
                    .flatten()
                    .map(str::to_owned),
                most_recent: user.get_str("MostRecent").ok().flatten() == Some("1"),
            })
        })
        .sorted_by_key(|account| (!account.most_recent, account.account_name.to_lowercase()))
        .collect())
}

/// Get the accounts which have logged in to the Steam installation at `install_root`. Missing
/// or unreadable files result in an empty list.
#[tracing::instrument(level = "trace")]
pub fn get_accounts(install_root: &Path) -> Vec<Account> {
    let path_login_users = install_root.join("config/loginusers.vdf");

    let Ok(file_content) = read_to_string(&path_login_users) else {
        debug!("{LAUNCHER} - Could not read {path_login_users:?}");
        return Vec::new();
    };

    parse_login_users(&file_content).unwrap_or_else(|e| {
        warn!("{LAUNCHER} - Could not parse {path_login_users:?}: {e}");
        Vec::new()
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_utils::get_mock_file_system_path;

    #[test]
    fn test_get_accounts() {
        let accounts = get_accounts(&get_mock_file_system_path().join("Steam"));

        assert_eq!(
            accounts,
            [
                Account {
                    steam_id: "76561198000000001".into(),
                    account_name: "second_account".into(),
                    persona_name: Some("Player Two".into()),
                    most_recent: true,
                },
                Account {
                    steam_id: "76561197960287930".into(),
                    account_name: "gaben".into(),
                    persona_name: Some("Gabe".into()),
                    most_recent: false,
                },
            ]
        );
    }

    #[test]
    fn test_user_without_account_name() {
        let accounts = parse_login_users(
            r#""users" { "1" { "PersonaName" "Nobody" } "2" { "AccountName" "someone" } }"#,
        )
        .unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_name, "someone");
        assert_eq!(accounts[0].persona_name, None);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(get_accounts(dir.path()).is_empty());
    }
}
