use std::{
    io::{self, Stdout, Write},
    panic,
    path::{Path, PathBuf},
    sync::Once,
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyEvent, KeyEventKind},
    execute, queue,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::debug;

use super::{
    ListState, MenuView, Notice, Picker, PickerOutcome, Selection, SettingsAction, SettingsView,
    render::{box_width, page_size, render_list, render_picker, render_prompt},
};
use crate::{app::Frontend, utils::clean_user_path};

const SETTINGS_OPTIONS: [&str; 5] = [
    "Change install root",
    "Add library folder",
    "Remove library folder",
    "Select account",
    "Back",
];

/// Interactive frontend drawing to the terminal with crossterm.
///
/// Raw mode and the alternate screen are active for as long as this value lives, and are
/// restored when it is dropped.
pub struct TerminalFrontend {
    out: Stdout,
    state: ListState,
}

/// Leaves the alternate screen and raw mode. Safe to call more than once.
fn restore_terminal() {
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Enters raw mode and the alternate screen, leaving raw mode again if the rest fails
fn set_up_terminal(out: &mut impl Write) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(out, EnterAlternateScreen, Hide).inspect_err(|_| {
        let _ = terminal::disable_raw_mode();
    })
}

/// Restores the terminal before the default panic message is printed
fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            default_hook(info);
        }));
    });
}

impl TerminalFrontend {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        set_up_terminal(&mut out)?;
        install_panic_hook();

        Ok(Self {
            out,
            state: ListState::default(),
        })
    }

    /// Box width and number of list rows for the current terminal size
    fn dimensions() -> (usize, usize) {
        let (columns, rows) = terminal::size().unwrap_or((80, 24));
        (box_width(columns), page_size(rows))
    }

    fn begin_frame(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))
    }

    /// Blocks until a key is pressed. Other events, such as a resize, return `None` so that the
    /// caller redraws.
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    /// Reads a line of text with the terminal temporarily back in normal mode. `None` on end
    /// of input.
    fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        terminal::disable_raw_mode()?;
        execute!(self.out, Show)?;
        write!(self.out, " {label}: ")?;
        self.out.flush()?;

        let mut line = String::new();
        let read = io::stdin().read_line(&mut line);

        execute!(self.out, Hide)?;
        terminal::enable_raw_mode()?;

        Ok(match read? {
            0 => None,
            _ => Some(line.trim_end_matches(['\r', '\n']).to_owned()),
        })
    }

    fn text_input(
        &mut self,
        title: &str,
        info: &[String],
        label: &str,
        notice: Option<&Notice>,
    ) -> io::Result<Option<String>> {
        let (width, _) = Self::dimensions();
        self.begin_frame()?;
        render_prompt(&mut self.out, title, info, width, notice)?;
        self.read_line(label)
    }

    /// Lets the user pick one of `options`. `None` if the pick was cancelled.
    fn pick(
        &mut self,
        title: &str,
        info: &[String],
        options: &[String],
        selected: usize,
        notice: Option<&Notice>,
    ) -> io::Result<Option<usize>> {
        let mut picker = Picker::new(selected);
        let mut notice = notice;

        loop {
            let (width, _) = Self::dimensions();
            self.begin_frame()?;
            render_picker(&mut self.out, title, info, options, &picker, width, notice)?;
            self.out.flush()?;

            let Some(key) = self.next_key()? else {
                continue;
            };
            notice = None;
            match picker.handle_key(key, options.len()) {
                Some(PickerOutcome::Chosen(index)) => return Ok(Some(index)),
                Some(PickerOutcome::Cancelled) => return Ok(None),
                None => {}
            }
        }
    }

    /// Asks for a directory path, `None` if nothing was entered
    fn path_input(&mut self, title: &str, current: Option<&Path>) -> io::Result<Option<PathBuf>> {
        let mut info = vec!["Enter a directory, or leave empty to cancel.".to_string()];
        if let Some(current) = current {
            info.push(format!("Current: {}", current.display()));
        }

        Ok(self
            .text_input(title, &info, "Path", None)?
            .as_deref()
            .and_then(clean_user_path))
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        restore_terminal();
    }
}

impl Frontend for TerminalFrontend {
    fn prompt_install_root(
        &mut self,
        suggestion: Option<&Path>,
        problem: Option<&Notice>,
    ) -> io::Result<Option<PathBuf>> {
        let mut info = vec!["Enter the directory Steam is installed in.".to_string()];
        match suggestion {
            Some(path) => {
                info.push(format!("Detected: {}", path.display()));
                info.push("Press Enter to use it, or type q to quit.".to_string());
            }
            None => info.push("Type q to quit.".to_string()),
        }

        let mut notice = problem.cloned();
        loop {
            let Some(input) =
                self.text_input("STEAM INSTALL ROOT", &info, "Install root", notice.as_ref())?
            else {
                return Ok(None);
            };

            match input.trim() {
                "q" | "Q" => return Ok(None),
                "" => match suggestion {
                    Some(path) => return Ok(Some(path.to_path_buf())),
                    None => notice = Some(Notice::warning("Please enter a directory")),
                },
                other => {
                    if let Some(path) = clean_user_path(other) {
                        return Ok(Some(path));
                    }
                    notice = Some(Notice::warning("Please enter a directory"));
                }
            }
        }
    }

    fn select(&mut self, view: &MenuView) -> io::Result<Selection> {
        let mut notice = view.notice;

        loop {
            let (width, page_size) = Self::dimensions();
            self.state.clamp(view.catalog.len(), page_size);

            self.begin_frame()?;
            render_list(
                &mut self.out,
                &MenuView { notice, ..*view },
                &self.state,
                width,
                page_size,
            )?;
            self.out.flush()?;

            let Some(key) = self.next_key()? else {
                continue;
            };
            notice = None;
            if let Some(selection) = self.state.handle_key(key, view.catalog, page_size) {
                debug!("Selected: {selection:?}");
                return Ok(selection);
            }
        }
    }

    fn settings(&mut self, view: &SettingsView) -> io::Result<SettingsAction> {
        let info = vec![
            format!(
                "Install root: {}",
                view.install_root
                    .map_or_else(|| "not set".to_string(), |p| p.display().to_string())
            ),
            format!("Account: {}", view.account.unwrap_or("default")),
            format!("Extra libraries: {}", view.extra_libraries.len()),
        ];
        let options = SETTINGS_OPTIONS.map(String::from);
        let mut notice = view.notice.cloned();

        loop {
            let Some(choice) = self.pick("SETTINGS", &info, &options, 0, notice.take().as_ref())?
            else {
                return Ok(SettingsAction::Back);
            };

            match choice {
                0 => {
                    if let Some(path) = self.path_input("CHANGE INSTALL ROOT", view.install_root)? {
                        return Ok(SettingsAction::ChangeInstallRoot(path));
                    }
                }
                1 => {
                    if let Some(path) = self.path_input("ADD LIBRARY FOLDER", None)? {
                        return Ok(SettingsAction::AddLibrary(path));
                    }
                }
                2 if view.extra_libraries.is_empty() => {
                    notice = Some(Notice::warning("No library folders have been added"));
                }
                2 => {
                    let libraries = view
                        .extra_libraries
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>();
                    if let Some(index) =
                        self.pick("REMOVE LIBRARY FOLDER", &[], &libraries, 0, None)?
                    {
                        return Ok(SettingsAction::RemoveLibrary(index));
                    }
                }
                3 => {
                    let options = std::iter::once("Default (no login)".to_string())
                        .chain(view.accounts.iter().map(ToString::to_string))
                        .collect::<Vec<_>>();
                    let current = view
                        .account
                        .and_then(|a| view.accounts.iter().position(|acc| acc.account_name == a))
                        .map_or(0, |i| i + 1);
                    let info = if view.accounts.is_empty() {
                        vec!["No accounts have logged in to this Steam installation".to_string()]
                    } else {
                        Vec::new()
                    };

                    if let Some(index) = self.pick("SELECT ACCOUNT", &info, &options, current, None)? {
                        return Ok(SettingsAction::SelectAccount(
                            index
                                .checked_sub(1)
                                .and_then(|i| view.accounts.get(i))
                                .map(|a| a.account_name.clone()),
                        ));
                    }
                }
                _ => return Ok(SettingsAction::Back),
            }
        }
    }

    fn scanning(&mut self, install_root: &Path) -> io::Result<()> {
        let (width, _) = Self::dimensions();
        self.begin_frame()?;
        render_prompt(
            &mut self.out,
            "STEAM GAME MENU",
            &[format!("Scanning {}", install_root.display())],
            width,
            None,
        )?;
        self.out.flush()
    }
}
