use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Editing screen: optional loaded-file banner, two side-by-side panes and
/// a status line, inset by a one-row, two-column margin.
pub struct EditorLayout {
    pub banner: Option<Rect>,
    pub input: Rect,
    pub output: Rect,
    pub status: Rect,
}

impl EditorLayout {
    pub fn new(area: Rect, show_banner: bool) -> Self {
        let inner = area.inner(Margin {
            horizontal: 2,
            vertical: 1,
        });

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(u16::from(show_banner)),
                Constraint::Min(3),
                Constraint::Length(2),
            ])
            .split(inner);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(vertical[1]);

        Self {
            banner: show_banner.then_some(vertical[0]),
            input: panes[0],
            output: panes[1],
            status: vertical[2],
        }
    }
}

/// Full-screen area for list and picker views, same margin as the editor.
pub fn framed(area: Rect) -> Rect {
    area.inner(Margin {
        horizontal: 2,
        vertical: 1,
    })
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 7;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

/// First visible index so that `cursor` stays inside a `height`-row window.
pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    cursor.saturating_sub(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panes_split_evenly_below_banner() {
        let layout = EditorLayout::new(Rect::new(0, 0, 100, 30), true);
        let banner = layout.banner.unwrap();
        assert_eq!(banner.height, 1);
        assert_eq!(layout.input.width, layout.output.width);
        assert_eq!(layout.input.y, banner.y + 1);
        assert_eq!(layout.status.height, 2);
    }

    #[test]
    fn banner_hidden_when_nothing_loaded() {
        let layout = EditorLayout::new(Rect::new(0, 0, 100, 30), false);
        assert!(layout.banner.is_none());
        assert_eq!(layout.input.y, 1);
    }

    #[test]
    fn centered_rect_fits_small_areas() {
        let area = Rect::new(0, 0, 30, 5);
        let popup = centered_rect(50, 50, area);
        assert_eq!(popup, area);
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        assert_eq!(scroll_offset(3, 10), 0);
        assert_eq!(scroll_offset(12, 10), 3);
        assert_eq!(scroll_offset(5, 0), 5);
    }
}
