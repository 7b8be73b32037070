//! The main control loop. Owns the settings and the catalog, and moves between the prompt,
//! list and settings screens until the user quits.
use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    data::{AppId, Catalog},
    launch::GameLauncher,
    menu::{MenuView, Notice, Selection, SettingsAction, SettingsView},
    settings::{Settings, SettingsStore},
    steam::{detect_install_roots, get_accounts, scan_with_libraries},
};

/// The user-facing side of the application. Every method blocks until the user has responded.
pub trait Frontend {
    /// Asks for the Steam install root. `None` means the user wants to quit instead.
    fn prompt_install_root(
        &mut self,
        suggestion: Option<&Path>,
        problem: Option<&Notice>,
    ) -> io::Result<Option<PathBuf>>;

    /// Shows the catalog and waits for a selection
    fn select(&mut self, view: &MenuView) -> io::Result<Selection>;

    /// Shows the settings screen and waits for a single change (or for the user to go back)
    fn settings(&mut self, view: &SettingsView) -> io::Result<SettingsAction>;

    /// Called right before a scan starts
    fn scanning(&mut self, install_root: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    PromptRoot(Option<Notice>),
    Scan,
    List,
    Settings { rescan: bool },
    Quit,
}

pub struct App<F, L> {
    frontend: F,
    launcher: L,
    store: Option<SettingsStore>,
    settings: Settings,
    /// Settings as last written to the store
    saved: Option<Settings>,
    catalog: Catalog,
    notice: Option<Notice>,
}

impl<F: Frontend, L: GameLauncher> App<F, L> {
    /// Creates the app, loading settings from `store`. Without a store, nothing is persisted.
    pub fn new(frontend: F, launcher: L, store: Option<SettingsStore>) -> Self {
        let saved = store.as_ref().and_then(SettingsStore::load);
        let notice = store.is_none().then(|| {
            Notice::warning("No location for the settings file, changes will not be saved")
        });

        Self {
            frontend,
            launcher,
            store,
            settings: saved.clone().unwrap_or_default(),
            saved,
            catalog: Catalog::default(),
            notice,
        }
    }

    /// Uses the given install root instead of the stored one. It is saved after a successful
    /// scan, like a root entered at the prompt.
    pub fn with_install_root(mut self, install_root: PathBuf) -> Self {
        self.settings.install_root = Some(install_root);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    /// Runs until the user quits. Only errors from the frontend itself end the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        let mut screen = if self.settings.install_root.is_some() {
            Screen::Scan
        } else {
            Screen::PromptRoot(None)
        };

        while screen != Screen::Quit {
            debug!("Screen: {screen:?}");
            screen = self.step(screen)?;
        }

        Ok(())
    }

    fn step(&mut self, screen: Screen) -> io::Result<Screen> {
        match screen {
            Screen::PromptRoot(problem) => self.prompt_install_root(problem),
            Screen::Scan => self.scan(),
            Screen::List => self.list(),
            Screen::Settings { rescan } => self.settings_screen(rescan),
            Screen::Quit => Ok(Screen::Quit),
        }
    }

    fn prompt_install_root(&mut self, problem: Option<Notice>) -> io::Result<Screen> {
        let suggestion = self
            .settings
            .install_root
            .clone()
            .or_else(|| detect_install_roots().into_iter().next());

        Ok(
            match self
                .frontend
                .prompt_install_root(suggestion.as_deref(), problem.as_ref())?
            {
                Some(install_root) => {
                    self.settings.install_root = Some(install_root);
                    Screen::Scan
                }
                None => Screen::Quit,
            },
        )
    }

    fn scan(&mut self) -> io::Result<Screen> {
        let Some(install_root) = self.settings.install_root.clone() else {
            return Ok(Screen::PromptRoot(None));
        };

        self.frontend.scanning(&install_root)?;

        match scan_with_libraries(&install_root, &self.settings.extra_libraries) {
            Ok(catalog) => {
                info!("Scan of {install_root:?} found {} titles", catalog.len());
                self.catalog = catalog;
                self.persist();
                Ok(Screen::List)
            }
            Err(e) => {
                warn!("{e}");
                Ok(Screen::PromptRoot(Some(Notice::error(e.to_string()))))
            }
        }
    }

    /// Saves the settings if they changed. A failure is reported, but never stops the app.
    fn persist(&mut self) {
        if self.saved.as_ref() == Some(&self.settings) {
            return;
        }
        let Some(store) = &self.store else {
            return;
        };

        match store.save(&self.settings) {
            Ok(()) => self.saved = Some(self.settings.clone()),
            Err(e) => {
                warn!("Could not save settings to {:?}: {e}", store.path());
                self.notice = Some(Notice::warning(format!(
                    "Settings could not be saved, continuing without them: {e}"
                )));
            }
        }
    }

    fn list(&mut self) -> io::Result<Screen> {
        let notice = self.notice.take();
        let view = MenuView {
            catalog: &self.catalog,
            account: self.settings.last_account.as_deref(),
            notice: notice.as_ref(),
        };

        Ok(match self.frontend.select(&view)? {
            Selection::Launch(id) => {
                self.launch(&id);
                Screen::List
            }
            Selection::Refresh => Screen::Scan,
            Selection::Settings => Screen::Settings { rescan: false },
            Selection::Quit => Screen::Quit,
        })
    }

    fn launch(&mut self, id: &AppId) {
        let account = self.settings.last_account.as_deref();

        self.notice = Some(match self.launcher.launch(&self.catalog, id, account) {
            Ok(()) => {
                let name = self.catalog.get(id).map_or(id.as_str(), |t| t.name.as_str());
                Notice::info(format!("Launched {name}"))
            }
            Err(e) => {
                warn!("{e}");
                Notice::error(e.to_string())
            }
        });
    }

    fn settings_screen(&mut self, mut rescan: bool) -> io::Result<Screen> {
        let accounts = self
            .settings
            .install_root
            .as_deref()
            .map(get_accounts)
            .unwrap_or_default();
        let notice = self.notice.take();
        let view = SettingsView {
            install_root: self.settings.install_root.as_deref(),
            extra_libraries: &self.settings.extra_libraries,
            accounts: &accounts,
            account: self.settings.last_account.as_deref(),
            notice: notice.as_ref(),
        };

        match self.frontend.settings(&view)? {
            SettingsAction::Back => {
                return Ok(if rescan { Screen::Scan } else { Screen::List });
            }
            SettingsAction::ChangeInstallRoot(path) if !path.is_dir() => {
                self.notice = Some(Notice::error(format!("Not a directory: {}", path.display())));
            }
            SettingsAction::ChangeInstallRoot(path) => {
                self.notice = Some(Notice::info(format!("Install root set to {}", path.display())));
                self.settings.install_root = Some(path);
                rescan = true;
                self.persist();
            }
            SettingsAction::AddLibrary(path) if !path.is_dir() => {
                self.notice = Some(Notice::error(format!("Not a directory: {}", path.display())));
            }
            SettingsAction::AddLibrary(path) => {
                let display = path.display().to_string();
                if self.settings.add_library(path) {
                    self.notice = Some(Notice::info(format!("Added library {display}")));
                    rescan = true;
                    self.persist();
                } else {
                    self.notice = Some(Notice::warning(format!("Library already added: {display}")));
                }
            }
            SettingsAction::RemoveLibrary(index) => {
                if let Some(path) = self.settings.remove_library(index) {
                    self.notice = Some(Notice::info(format!("Removed library {}", path.display())));
                    rescan = true;
                    self.persist();
                }
            }
            SettingsAction::SelectAccount(account) => {
                self.notice = Some(Notice::info(match &account {
                    Some(name) => format!("Titles will be launched as {name}"),
                    None => "Titles will be launched with the default account".to_string(),
                }));
                self.settings.last_account = account;
                self.persist();
            }
        }

        Ok(Screen::Settings { rescan })
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, collections::VecDeque, fs};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::{LaunchCause, LaunchError},
        menu::NoticeLevel,
        test_utils::TestSteam,
    };

    /// Frontend answering from queues of canned responses, recording what it was shown
    #[derive(Default)]
    struct ScriptedFrontend {
        roots: VecDeque<Option<PathBuf>>,
        selections: VecDeque<Selection>,
        settings_actions: VecDeque<SettingsAction>,
        prompt_problems: Vec<Option<Notice>>,
        shown_titles: Vec<Vec<String>>,
        notices: Vec<Notice>,
        scans: usize,
    }

    impl Frontend for ScriptedFrontend {
        fn prompt_install_root(
            &mut self,
            _suggestion: Option<&Path>,
            problem: Option<&Notice>,
        ) -> io::Result<Option<PathBuf>> {
            self.prompt_problems.push(problem.cloned());
            Ok(self.roots.pop_front().flatten())
        }

        fn select(&mut self, view: &MenuView) -> io::Result<Selection> {
            self.shown_titles
                .push(view.catalog.iter().map(|t| t.name.clone()).collect());
            self.notices.extend(view.notice.cloned());
            Ok(self.selections.pop_front().unwrap_or(Selection::Quit))
        }

        fn settings(&mut self, view: &SettingsView) -> io::Result<SettingsAction> {
            self.notices.extend(view.notice.cloned());
            Ok(self
                .settings_actions
                .pop_front()
                .unwrap_or(SettingsAction::Back))
        }

        fn scanning(&mut self, _install_root: &Path) -> io::Result<()> {
            self.scans += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingLauncher {
        launched: RefCell<Vec<(AppId, Option<String>)>>,
    }

    impl GameLauncher for &RecordingLauncher {
        fn launch(
            &self,
            catalog: &Catalog,
            id: &AppId,
            account: Option<&str>,
        ) -> Result<(), LaunchError> {
            if catalog.get(id).is_none() {
                return Err(LaunchError::LaunchFailed {
                    id: id.clone(),
                    cause: LaunchCause::UnknownTitle,
                });
            }
            self.launched
                .borrow_mut()
                .push((id.clone(), account.map(str::to_owned)));
            Ok(())
        }
    }

    fn steam_with_games() -> TestSteam {
        let steam = TestSteam::new();
        steam.manifest(steam.root(), "20", "Game B");
        steam.manifest(steam.root(), "10", "Game A");
        steam
    }

    fn store_in(dir: &Path) -> SettingsStore {
        SettingsStore::new(dir.join("settings.json"))
    }

    #[test]
    fn test_first_run_prompts_and_saves() {
        let steam = steam_with_games();
        let store = store_in(steam.root());
        let launcher = RecordingLauncher::default();
        let frontend = ScriptedFrontend {
            roots: VecDeque::from([Some(steam.root().to_path_buf())]),
            ..Default::default()
        };

        let mut app = App::new(frontend, &launcher, Some(store.clone()));
        app.run().unwrap();

        assert_eq!(app.frontend().prompt_problems, [None]);
        assert_eq!(app.frontend().shown_titles, [["Game A", "Game B"]]);
        assert_eq!(
            store.load(),
            Some(Settings {
                install_root: Some(steam.root().to_path_buf()),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_stored_root_skips_prompt() {
        let steam = steam_with_games();
        let store = store_in(steam.root());
        store
            .save(&Settings {
                install_root: Some(steam.root().to_path_buf()),
                ..Default::default()
            })
            .unwrap();

        let launcher = RecordingLauncher::default();
        let mut app = App::new(ScriptedFrontend::default(), &launcher, Some(store));
        app.run().unwrap();

        assert!(app.frontend().prompt_problems.is_empty());
        assert_eq!(app.catalog().len(), 2);
    }

    #[test]
    fn test_corrupt_settings_prompt_for_root() {
        let steam = steam_with_games();
        let store = store_in(steam.root());
        fs::write(store.path(), "{ definitely not json").unwrap();

        let launcher = RecordingLauncher::default();
        let frontend = ScriptedFrontend {
            roots: VecDeque::from([Some(steam.root().to_path_buf())]),
            ..Default::default()
        };
        let mut app = App::new(frontend, &launcher, Some(store.clone()));
        app.run().unwrap();

        assert_eq!(app.frontend().prompt_problems, [None]);
        // The corrupt file is replaced after the successful scan
        assert!(store.load().is_some());
    }

    #[test]
    fn test_invalid_root_prompts_again() {
        let steam = steam_with_games();
        let launcher = RecordingLauncher::default();
        let frontend = ScriptedFrontend {
            roots: VecDeque::from([
                Some(steam.root().join("missing")),
                Some(steam.root().to_path_buf()),
            ]),
            ..Default::default()
        };

        let mut app = App::new(frontend, &launcher, Some(store_in(steam.root())));
        app.run().unwrap();

        let problems = &app.frontend().prompt_problems;
        assert_eq!(problems.len(), 2);
        assert!(problems[0].is_none());
        assert!(problems[1].as_ref().is_some_and(|n| n.level == NoticeLevel::Error));
        assert_eq!(app.catalog().len(), 2);
    }

    #[test]
    fn test_quit_at_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let launcher = RecordingLauncher::default();

        let mut app = App::new(ScriptedFrontend::default(), &launcher, Some(store.clone()));
        app.run().unwrap();

        assert_eq!(app.frontend().scans, 0);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_failed_launch_keeps_menu_running() {
        let steam = steam_with_games();
        let launcher = RecordingLauncher::default();
        let frontend = ScriptedFrontend {
            selections: VecDeque::from([
                Selection::Launch(AppId::from("999")),
                Selection::Launch(AppId::from("10")),
            ]),
            ..Default::default()
        };

        let mut app = App::new(frontend, &launcher, None).with_install_root(steam.root().into());
        app.run().unwrap();

        let levels = app
            .frontend()
            .notices
            .iter()
            .map(|n| n.level)
            .collect::<Vec<_>>();
        assert_eq!(
            levels,
            [NoticeLevel::Warning, NoticeLevel::Error, NoticeLevel::Info]
        );
        assert_eq!(app.frontend().notices[2].text, "Launched Game A");
        assert_eq!(*launcher.launched.borrow(), [(AppId::from("10"), None)]);
    }

    #[test]
    fn test_refresh_rescans() {
        let steam = steam_with_games();
        let launcher = RecordingLauncher::default();
        let frontend = ScriptedFrontend {
            selections: VecDeque::from([Selection::Refresh]),
            ..Default::default()
        };

        let mut app = App::new(frontend, &launcher, Some(store_in(steam.root())))
            .with_install_root(steam.root().into());
        app.run().unwrap();

        assert_eq!(app.frontend().scans, 2);
        assert_eq!(app.frontend().shown_titles.len(), 2);
    }

    #[test]
    fn test_settings_changes_are_saved_and_rescanned() {
        let steam = steam_with_games();
        let extra = steam.library("extra");
        steam.manifest(&extra, "30", "Game C");
        let store = store_in(steam.root());

        let launcher = RecordingLauncher::default();
        let frontend = ScriptedFrontend {
            selections: VecDeque::from([
                Selection::Settings,
                Selection::Launch(AppId::from("30")),
            ]),
            settings_actions: VecDeque::from([
                SettingsAction::AddLibrary(steam.root().join("not_a_dir")),
                SettingsAction::AddLibrary(extra.clone()),
                SettingsAction::AddLibrary(extra.clone()),
                SettingsAction::SelectAccount(Some("gaben".into())),
                SettingsAction::Back,
            ]),
            ..Default::default()
        };

        let mut app = App::new(frontend, &launcher, Some(store.clone()))
            .with_install_root(steam.root().into());
        app.run().unwrap();

        assert_eq!(
            app.frontend().shown_titles,
            [
                vec!["Game A", "Game B"],
                vec!["Game A", "Game B", "Game C"],
                vec!["Game A", "Game B", "Game C"],
            ]
        );
        assert_eq!(
            *launcher.launched.borrow(),
            [(AppId::from("30"), Some("gaben".to_string()))]
        );
        assert_eq!(
            store.load(),
            Some(Settings {
                install_root: Some(steam.root().to_path_buf()),
                last_account: Some("gaben".into()),
                extra_libraries: vec![extra],
            })
        );

        let levels = app
            .frontend()
            .notices
            .iter()
            .map(|n| n.level)
            .collect::<Vec<_>>();
        assert_eq!(
            levels,
            [
                NoticeLevel::Error,
                NoticeLevel::Info,
                NoticeLevel::Warning,
                NoticeLevel::Info,
                NoticeLevel::Info,
            ]
        );
    }

    #[test]
    fn test_unwritable_settings_only_warn() {
        let steam = steam_with_games();
        let blocker = steam.root().join("blocker");
        fs::write(&blocker, "").unwrap();

        let launcher = RecordingLauncher::default();
        let mut app = App::new(
            ScriptedFrontend::default(),
            &launcher,
            Some(SettingsStore::new(blocker.join("settings.json"))),
        )
        .with_install_root(steam.root().into());
        app.run().unwrap();

        assert_eq!(app.catalog().len(), 2);
        assert!(matches!(
            app.frontend().notices.as_slice(),
            [Notice {
                level: NoticeLevel::Warning,
                ..
            }]
        ));
    }
}
