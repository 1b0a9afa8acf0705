use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::layout::scroll_offset;
use crate::ui::theme::Theme;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub is_dir: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowseOutcome {
    Stayed,
    Selected(PathBuf),
}

/// Directory browser that only offers sub-directories and files with one
/// extension.
#[derive(Clone, Debug)]
pub struct FileBrowser {
    pub dir: PathBuf,
    pub entries: Vec<BrowserEntry>,
    pub selected: usize,
    pub error: Option<String>,
    extension: String,
}

impl FileBrowser {
    pub fn new(dir: PathBuf, extension: &str) -> Self {
        Self {
            dir,
            entries: Vec::new(),
            selected: 0,
            error: None,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Re-read the current directory. An unreadable directory leaves the
    /// listing empty and records the reason.
    pub fn refresh(&mut self) {
        self.selected = 0;
        match list_dir(&self.dir, &self.extension) {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
            }
            Err(err) => {
                self.entries.clear();
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn parent(&mut self) {
        if let Some(parent) = self.dir.parent() {
            self.dir = parent.to_path_buf();
            self.refresh();
        }
    }

    /// Enter descends into a directory or picks a file.
    pub fn activate(&mut self) -> BrowseOutcome {
        let Some(entry) = self.entries.get(self.selected) else {
            return BrowseOutcome::Stayed;
        };
        let path = self.dir.join(&entry.name);
        if entry.is_dir {
            self.dir = path;
            self.refresh();
            BrowseOutcome::Stayed
        } else {
            BrowseOutcome::Selected(path)
        }
    }
}

fn list_dir(dir: &Path, extension: &str) -> io::Result<Vec<BrowserEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        // Follow symlinks so linked directories can be browsed.
        let is_dir = fs::metadata(entry.path()).is_ok_and(|m| m.is_dir());
        let wanted = is_dir
            || Path::new(&name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if wanted {
            entries.push(BrowserEntry { name, is_dir });
        }
    }
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

pub struct FileBrowserView<'a> {
    browser: &'a FileBrowser,
    theme: &'a Theme,
}

impl<'a> FileBrowserView<'a> {
    pub fn new(browser: &'a FileBrowser, theme: &'a Theme) -> Self {
        Self { browser, theme }
    }
}

impl Widget for FileBrowserView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.browser.dir.display()))
            .title_bottom(Span::styled(
                " Enter: open | Backspace: up | Esc: cancel ",
                Style::default().fg(colors.muted()),
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if let Some(ref err) = self.browser.error {
            Paragraph::new(Span::styled(
                format!("Cannot read directory: {err}"),
                Style::default().fg(colors.error()),
            ))
            .render(inner, buf);
            return;
        }
        if self.browser.entries.is_empty() {
            Paragraph::new(Span::styled(
                format!("No directories or .{} files here.", self.browser.extension),
                Style::default().fg(colors.muted()),
            ))
            .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let offset = scroll_offset(self.browser.selected, height);
        let lines: Vec<Line> = self
            .browser
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, entry)| {
                let is_selected = i == self.browser.selected;
                let label = if entry.is_dir {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                };
                let mut style = Style::default().fg(if entry.is_dir {
                    colors.accent()
                } else {
                    colors.fg()
                });
                if is_selected {
                    style = style.bg(colors.selection_bg()).add_modifier(Modifier::BOLD);
                }
                Line::from(Span::styled(
                    format!("{} {label}", if is_selected { ">" } else { " " }),
                    style,
                ))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
