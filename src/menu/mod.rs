//! The interactive terminal menu: key handling, rendering, and the crossterm frontend.
//!
//! Key handling is kept free of any terminal I/O so that it can be driven directly from tests.
pub mod render;
mod terminal;

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
pub use terminal::TerminalFrontend;

use crate::data::{Account, AppId, Catalog};

/// Longest number which can be typed to pick a title
const MAX_TYPED_DIGITS: usize = 6;

/// What the user chose in the main list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Launch(AppId),
    Refresh,
    Settings,
    Quit,
}

/// A change requested from the settings screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    ChangeInstallRoot(PathBuf),
    AddLibrary(PathBuf),
    RemoveLibrary(usize),
    SelectAccount(Option<String>),
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line message shown to the user until the next action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Everything the main list displays
#[derive(Debug, Clone, Copy)]
pub struct MenuView<'a> {
    pub catalog: &'a Catalog,
    pub account: Option<&'a str>,
    pub notice: Option<&'a Notice>,
}

/// Everything the settings screen displays
#[derive(Debug, Clone, Copy)]
pub struct SettingsView<'a> {
    pub install_root: Option<&'a Path>,
    pub extra_libraries: &'a [PathBuf],
    pub accounts: &'a [Account],
    pub account: Option<&'a str>,
    pub notice: Option<&'a Notice>,
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

// MAIN LIST ----------------------------------------------------------------------------
/// Cursor, scroll position and typed number of the main list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    selected: usize,
    offset: usize,
    typed: String,
    notice: Option<Notice>,
}

impl ListState {
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index of the first row shown
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Message produced by the last key press, e.g. for an invalid title number
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Keeps the cursor inside a list of `len` rows, with `page_size` rows visible
    pub fn clamp(&mut self, len: usize, page_size: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        let page_size = page_size.max(1);

        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + page_size {
            self.offset = self.selected + 1 - page_size;
        }
        self.offset = self.offset.min(len.saturating_sub(page_size));
    }

    fn step(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn jump(&mut self, delta: isize, len: usize) {
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    fn take_typed_number(&mut self, len: usize) -> Result<usize, Notice> {
        let typed = std::mem::take(&mut self.typed);
        match typed.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
            _ => Err(Notice::error(format!("There is no title number {typed}"))),
        }
    }

    /// Maps a key press to a selection. Returns `None` while the user is still navigating.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        catalog: &Catalog,
        page_size: usize,
    ) -> Option<Selection> {
        let len = catalog.len();
        self.notice = None;

        if is_ctrl_c(&key) {
            return Some(Selection::Quit);
        }

        let selection = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.step(-1, len);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.step(1, len);
                None
            }
            KeyCode::PageUp => {
                self.jump(-(page_size as isize), len);
                None
            }
            KeyCode::PageDown => {
                self.jump(page_size as isize, len);
                None
            }
            KeyCode::Home => {
                self.selected = 0;
                None
            }
            KeyCode::End => {
                self.selected = len.saturating_sub(1);
                None
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.typed.len() < MAX_TYPED_DIGITS {
                    self.typed.push(c);
                }
                // Follow the typed number while it names a row
                if let Ok(n) = self.typed.parse::<usize>() {
                    if (1..=len).contains(&n) {
                        self.selected = n - 1;
                    }
                }
                None
            }
            KeyCode::Backspace => {
                self.typed.pop();
                None
            }
            KeyCode::Enter if !self.typed.is_empty() => match self.take_typed_number(len) {
                Ok(index) => {
                    self.selected = index;
                    Some(Selection::Launch(catalog.titles()[index].id.clone()))
                }
                Err(notice) => {
                    self.notice = Some(notice);
                    None
                }
            },
            KeyCode::Enter => catalog
                .titles()
                .get(self.selected)
                .map(|title| Selection::Launch(title.id.clone())),
            KeyCode::Esc if !self.typed.is_empty() => {
                self.typed.clear();
                None
            }
            KeyCode::Char('r' | 'R') | KeyCode::F(5) => Some(Selection::Refresh),
            KeyCode::Char('s' | 'S') => Some(Selection::Settings),
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Selection::Quit),
            _ => None,
        };

        self.clamp(len, page_size);
        selection
    }
}

// PICKER -------------------------------------------------------------------------------
/// Result of a finished pick from a short list of options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    Chosen(usize),
    Cancelled,
}

/// Cursor over a short list of options, such as the settings screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Picker {
    selected: usize,
}

impl Picker {
    pub fn new(selected: usize) -> Self {
        Self { selected }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn handle_key(&mut self, key: KeyEvent, len: usize) -> Option<PickerOutcome> {
        if is_ctrl_c(&key) {
            return Some(PickerOutcome::Cancelled);
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                self.selected = (self.selected + len - 1) % len;
                None
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                self.selected = (self.selected + 1) % len;
                None
            }
            KeyCode::Home => {
                self.selected = 0;
                None
            }
            KeyCode::End => {
                self.selected = len.saturating_sub(1);
                None
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                (index < len).then(|| {
                    self.selected = index;
                    PickerOutcome::Chosen(index)
                })
            }
            KeyCode::Enter if len > 0 => Some(PickerOutcome::Chosen(self.selected.min(len - 1))),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q' | 'Q') => {
                Some(PickerOutcome::Cancelled)
            }
            _ => None,
        }
    }
}
