use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};

use crate::ui::layout::scroll_offset;
use crate::ui::text_area::TextArea;
use crate::ui::theme::Theme;

/// One bordered text panel with a line-number gutter. The focused pane gets
/// the rounded accent border and a visible cursor.
pub struct EditorPane<'a> {
    area: &'a TextArea,
    title: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> EditorPane<'a> {
    pub fn new(area: &'a TextArea, title: &'a str, focused: bool, theme: &'a Theme) -> Self {
        Self {
            area,
            title,
            focused,
            theme,
        }
    }
}

impl Widget for EditorPane<'_> {
    fn render(self, rect: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let (border_type, border_color) = if self.focused {
            (BorderType::Rounded, colors.border_focused())
        } else {
            (BorderType::Plain, colors.border())
        };
        let block = Block::bordered()
            .border_type(border_type)
            .border_style(Style::default().fg(border_color))
            .title(format!(" {} ", self.title))
            .style(Style::default().bg(colors.bg()).fg(colors.fg()));
        let inner = block.inner(rect);
        block.render(rect, buf);

        if self.area.is_empty() && !self.focused {
            Paragraph::new(Span::styled(
                self.area.placeholder(),
                Style::default().fg(colors.placeholder()),
            ))
            .render(inner, buf);
            return;
        }

        let (cursor_row, cursor_col) = self.area.cursor();
        let lines = self.area.lines();
        let gutter = lines.len().to_string().len().max(2);
        let text_width = (inner.width as usize).saturating_sub(gutter + 1).max(1);
        let row_offset = scroll_offset(cursor_row, inner.height as usize);
        let col_offset = if self.focused {
            scroll_offset(cursor_col, text_width)
        } else {
            0
        };

        let rendered: Vec<Line> = lines
            .iter()
            .enumerate()
            .skip(row_offset)
            .take(inner.height as usize)
            .map(|(row, text)| {
                let is_cursor_row = row == cursor_row;
                let number_style = Style::default().fg(if is_cursor_row {
                    colors.line_number_active()
                } else {
                    colors.line_number()
                });
                let mut spans = vec![Span::styled(
                    format!("{:>gutter$} ", row + 1),
                    number_style,
                )];

                let visible: Vec<char> = text.chars().skip(col_offset).collect();
                if self.focused && is_cursor_row {
                    let at = cursor_col - col_offset;
                    let before: String = visible.iter().take(at).collect();
                    let cursor_ch = visible.get(at).copied().unwrap_or(' ');
                    let after: String = visible.iter().skip(at + 1).collect();
                    spans.push(Span::raw(before));
                    spans.push(Span::styled(
                        cursor_ch.to_string(),
                        Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg()),
                    ));
                    spans.push(Span::raw(after));
                } else {
                    spans.push(Span::raw(visible.into_iter().collect::<String>()));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(rendered).render(inner, buf);
    }
}
