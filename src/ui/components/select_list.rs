use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::generator::models::ModelOption;
use crate::ui::theme::Theme;
use crate::vocab::QuestionType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListItem {
    pub title: String,
    pub id: String,
    pub description: String,
}

impl From<&ModelOption> for ListItem {
    fn from(model: &ModelOption) -> Self {
        Self {
            title: model.title.to_string(),
            id: model.id.to_string(),
            description: model.note.to_string(),
        }
    }
}

impl From<QuestionType> for ListItem {
    fn from(qt: QuestionType) -> Self {
        Self {
            title: qt.id().to_string(),
            id: qt.id().to_string(),
            description: String::new(),
        }
    }
}

/// Titled single-choice list, wrapping at both ends.
#[derive(Clone, Debug, Default)]
pub struct SelectList {
    pub title: String,
    pub items: Vec<ListItem>,
    pub selected: usize,
}

impl SelectList {
    pub fn new(title: &str, items: Vec<ListItem>) -> Self {
        Self {
            title: title.to_string(),
            items,
            selected: 0,
        }
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn selected_item(&self) -> Option<&ListItem> {
        self.items.get(self.selected)
    }
}

pub struct SelectListView<'a> {
    list: &'a SelectList,
    theme: &'a Theme,
}

impl<'a> SelectListView<'a> {
    pub fn new(list: &'a SelectList, theme: &'a Theme) -> Self {
        Self { list, theme }
    }
}

impl Widget for SelectListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(Span::styled(
                format!(" {} ", self.list.title),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.list
                    .items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .chain(std::iter::once(Constraint::Min(0)))
                    .collect::<Vec<_>>(),
            )
            .split(inner);

        for (i, item) in self.list.items.iter().enumerate() {
            let is_selected = i == self.list.selected;
            let indicator = if is_selected { "│" } else { " " };

            let title_style = Style::default()
                .fg(if is_selected {
                    colors.accent()
                } else {
                    colors.fg()
                })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });

            let lines = vec![
                Line::from(Span::styled(format!(" {indicator} {}", item.title), title_style)),
                Line::from(Span::styled(
                    format!(" {indicator} {}", item.description),
                    Style::default().fg(colors.muted()),
                )),
            ];
            Paragraph::new(lines).render(rows[i], buf);
        }
    }
}
