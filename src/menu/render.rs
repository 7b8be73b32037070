//! Drawing of the menu screens. Every function writes complete lines terminated with `\r\n`, so
//! output is laid out correctly while the terminal is in raw mode.
use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use super::{ListState, MenuView, Notice, NoticeLevel, Picker};
use crate::utils::truncate_to_width;

/// Lines used by everything in the main list other than the title rows
pub const CHROME_LINES: usize = 11;

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 120;

/// Number of title rows which fit into a terminal with the given number of rows
pub fn page_size(rows: u16) -> usize {
    (rows as usize).saturating_sub(CHROME_LINES).max(1)
}

/// Width of the drawn box for a terminal with the given number of columns
pub fn box_width(columns: u16) -> usize {
    (columns as usize).clamp(MIN_WIDTH, MAX_WIDTH)
}

fn border(out: &mut impl Write, left: char, right: char, width: usize) -> io::Result<()> {
    let line = format!("{left}{}{right}", "═".repeat(width.saturating_sub(2)));
    write!(out, "{}\r\n", line.cyan())
}

/// Writes `text` padded to the inside of the box, styled with `style`
fn row(
    out: &mut impl Write,
    text: &str,
    width: usize,
    style: impl Fn(&str) -> ColoredString,
) -> io::Result<()> {
    let inner = width.saturating_sub(4);
    let text = truncate_to_width(text, inner);
    let padding = " ".repeat(inner - text.chars().count());
    write!(
        out,
        "{} {}{padding} {}\r\n",
        "║".cyan(),
        style(&text),
        "║".cyan()
    )
}

fn plain(text: &str) -> ColoredString {
    text.normal()
}

fn header(out: &mut impl Write, title: &str, width: usize) -> io::Result<()> {
    let inner = width.saturating_sub(4);
    let title = format!("{title:^inner$}");

    border(out, '╔', '╗', width)?;
    row(out, &title, width, |t| t.white().bold())?;
    border(out, '╠', '╣', width)
}

fn notice_line(out: &mut impl Write, notice: Option<&Notice>) -> io::Result<()> {
    let Some(notice) = notice else {
        return write!(out, "\r\n");
    };

    let text = match notice.level {
        NoticeLevel::Info => notice.text.green(),
        NoticeLevel::Warning => notice.text.yellow(),
        NoticeLevel::Error => notice.text.red(),
    };
    write!(out, " {text}\r\n")
}

/// Draws the main list of installed titles
pub fn render_list(
    out: &mut impl Write,
    view: &MenuView,
    state: &ListState,
    width: usize,
    page_size: usize,
) -> io::Result<()> {
    let catalog = view.catalog;

    header(out, "STEAM GAME MENU", width)?;
    row(
        out,
        &format!(
            "Account: {}   Libraries: {}   Root: {}",
            view.account.unwrap_or("default"),
            catalog.folders().len(),
            catalog.install_root().display()
        ),
        width,
        |t| t.yellow(),
    )?;
    border(out, '╠', '╣', width)?;

    if catalog.is_empty() {
        row(
            out,
            "No games found. Check the install root and libraries in settings.",
            width,
            |t| t.red(),
        )?;
        for _ in 1..page_size {
            row(out, "", width, plain)?;
        }
    } else {
        let number_width = catalog.len().to_string().len();
        let end = (state.offset() + page_size).min(catalog.len());

        for (index, title) in catalog.titles()[state.offset()..end]
            .iter()
            .enumerate()
            .map(|(i, t)| (i + state.offset(), t))
        {
            let is_selected = index == state.selected();
            let marker = if is_selected { '>' } else { ' ' };
            let text = format!("{marker} {:>number_width$}. {}", index + 1, title.name);

            if is_selected {
                row(out, &text, width, |t| t.white().bold())?;
            } else {
                row(out, &text, width, plain)?;
            }
        }
        for _ in (end - state.offset())..page_size {
            row(out, "", width, plain)?;
        }
    }

    border(out, '╠', '╣', width)?;
    row(
        out,
        &format!(
            "{} titles   showing {}-{}",
            catalog.len(),
            (state.offset() + 1).min(catalog.len()),
            (state.offset() + page_size).min(catalog.len())
        ),
        width,
        |t| t.dimmed(),
    )?;
    border(out, '╚', '╝', width)?;

    write!(
        out,
        " {}\r\n",
        "↑/↓ move   Enter launch   0-9 title number   r refresh   s settings   q quit".yellow()
    )?;
    if state.typed().is_empty() {
        write!(out, "\r\n")?;
    } else {
        write!(out, " Number: {}\r\n", state.typed().white().bold())?;
    }
    notice_line(out, state.notice().or(view.notice))
}

/// Draws a titled list of options with a cursor, with optional information lines above it
pub fn render_picker(
    out: &mut impl Write,
    title: &str,
    info: &[String],
    options: &[String],
    picker: &Picker,
    width: usize,
    notice: Option<&Notice>,
) -> io::Result<()> {
    header(out, title, width)?;

    if !info.is_empty() {
        for line in info {
            row(out, line, width, |t| t.yellow())?;
        }
        border(out, '╠', '╣', width)?;
    }

    if options.is_empty() {
        row(out, "Nothing to choose from", width, |t| t.red())?;
    }
    for (index, option) in options.iter().enumerate() {
        if index == picker.selected() {
            row(out, &format!("> {}. {option}", index + 1), width, |t| {
                t.white().bold()
            })?;
        } else {
            row(out, &format!("  {}. {option}", index + 1), width, plain)?;
        }
    }

    border(out, '╚', '╝', width)?;
    write!(
        out,
        " {}\r\n",
        "↑/↓ move   Enter select   1-9 choose   Esc back".yellow()
    )?;
    notice_line(out, notice)
}

/// Draws the header and explanation shown above a line of text input
pub fn render_prompt(
    out: &mut impl Write,
    title: &str,
    info: &[String],
    width: usize,
    notice: Option<&Notice>,
) -> io::Result<()> {
    header(out, title, width)?;
    for line in info {
        row(out, line, width, plain)?;
    }
    border(out, '╚', '╝', width)?;
    notice_line(out, notice)
}

#[cfg(test)]
mod test {
    use crossterm::event::{KeyCode, KeyEvent};
    use test_case::test_case;

    use super::*;
    use crate::{data::Catalog, steam::scan, test_utils::get_mock_file_system_path};

    fn render_to_string(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test_case(40, 29; "normal")]
    #[test_case(5, 1; "tiny")]
    fn test_page_size(rows: u16, expected: usize) {
        assert_eq!(page_size(rows), expected);
    }

    #[test]
    fn test_render_list() {
        let catalog = scan(&get_mock_file_system_path().join("Steam")).unwrap();
        let mut state = ListState::default();
        state.handle_key(KeyEvent::from(KeyCode::Down), &catalog, 3);
        let notice = Notice::info("Launched Portal 2");

        let view = MenuView {
            catalog: &catalog,
            account: Some("gaben"),
            notice: Some(&notice),
        };
        let output = render_to_string(|out| render_list(out, &view, &state, 80, 3));
        let lines = output.split("\r\n").collect::<Vec<_>>();

        assert!(output.contains("STEAM GAME MENU"));
        assert!(output.contains("Account: gaben"));
        assert!(output.contains("  1. Counter-Strike 2"));
        assert!(output.contains("> 2. Half-Life 2"));
        assert!(output.contains("  3. Portal 2"));
        assert!(!output.contains("Terraria"));
        assert!(output.contains("4 titles   showing 1-3"));
        assert!(output.contains("Launched Portal 2"));

        // Every row of the box has the same width
        let box_rows = lines.iter().filter(|l| l.starts_with('║')).collect::<Vec<_>>();
        assert!(box_rows.iter().all(|l| l.chars().count() == 80));
        assert_eq!(lines.len(), CHROME_LINES + 3 + 1);
    }

    #[test]
    fn test_render_empty_list() {
        let catalog = Catalog::default();
        let view = MenuView {
            catalog: &catalog,
            account: None,
            notice: None,
        };
        let output =
            render_to_string(|out| render_list(out, &view, &ListState::default(), 60, 4));

        assert!(output.contains("No games found"));
        assert!(output.contains("Account: default"));
        assert!(output.contains("0 titles"));
    }

    #[test]
    fn test_render_picker() {
        let options = vec!["Change install root".to_string(), "Back".to_string()];
        let output = render_to_string(|out| {
            render_picker(
                out,
                "SETTINGS",
                &["Install root: /opt/Steam".to_string()],
                &options,
                &Picker::new(1),
                60,
                Some(&Notice::error("Not a directory")),
            )
        });

        assert!(output.contains("  1. Change install root"));
        assert!(output.contains("> 2. Back"));
        assert!(output.contains("Install root: /opt/Steam"));
        assert!(output.contains("Not a directory"));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let output = render_to_string(|out| {
            render_prompt(out, "PROMPT", &["x".repeat(200)], 40, None)
        });

        assert!(output.lines().all(|l| l.trim_end_matches('\r').chars().count() <= 40));
    }
}
