use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Modal single-field prompt: label, the line editor, and a key hint.
pub struct PromptBox<'a> {
    label: &'a str,
    input: &'a LineInput,
    theme: &'a Theme,
}

impl<'a> PromptBox<'a> {
    pub fn new(label: &'a str, input: &'a LineInput, theme: &'a Theme) -> Self {
        Self {
            label,
            input,
            theme,
        }
    }
}

impl Widget for PromptBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()).fg(colors.fg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Span::styled(
            self.label,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))
        .render(rows[0], buf);

        let (before, cursor_ch, after) = self.input.render_parts();
        let cursor_style = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());
        let mut spans = vec![Span::raw("> "), Span::raw(before)];
        match cursor_ch {
            Some(ch) => spans.push(Span::styled(ch.to_string(), cursor_style)),
            None => spans.push(Span::styled(" ", cursor_style)),
        }
        spans.push(Span::raw(after));
        let mut field = vec![Line::from(spans)];
        if self.input.completion_error {
            field.push(Line::from(Span::styled(
                "(cannot read directory)",
                Style::default().fg(colors.error()),
            )));
        }
        Paragraph::new(field).render(rows[1], buf);

        Paragraph::new(Span::styled(
            "Enter: confirm | Esc: cancel",
            Style::default().fg(colors.muted()),
        ))
        .render(rows[3], buf);
    }
}
