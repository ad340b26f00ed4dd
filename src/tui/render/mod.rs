pub mod form_popup;
pub mod gantt_view;
pub mod help_overlay;
pub mod prd_view;
pub mod status_row;
pub mod tab_bar;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;

use super::app::{App, Mode, View};
use crate::util::unicode::{self, LineInput};

/// Cursor glyph drawn inside text being edited
pub(super) const CURSOR: &str = "\u{258C}";

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | content | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);

    match app.view {
        View::Prd => prd_view::render_prd_view(frame, app, chunks[1]),
        View::Tasks => task_list::render_task_list(frame, app, chunks[1]),
        View::Gantt => gantt_view::render_gantt_view(frame, app, chunks[1]),
    }

    if app.mode == Mode::Form {
        form_popup::render_form_popup(frame, app, chunks[1]);
    }

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }

    status_row::render_status_row(frame, app, chunks[2]);
}

/// Compute total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum()
}

/// Text of an input with the cursor glyph spliced in at the cursor
pub(super) fn with_cursor(input: &LineInput) -> String {
    let (before, after) = input.text().split_at(input.cursor());
    format!("{}{}{}", before, CURSOR, after)
}

/// A `width` x `height` rectangle centered in `area`, clamped to it
pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn full_screen_shows_tabs_and_empty_prd() {
        let mut app = offline_app(None);
        let output = render_to_string(TERM_W, TERM_H, |frame, _area| {
            render(frame, &mut app);
        });
        let first = output.lines().next().unwrap();
        assert!(first.contains("1 PRD"));
        assert!(first.contains("2 Tasks"));
        assert!(first.contains("3 Gantt"));
        assert!(output.contains("Title"));
    }

    #[test]
    fn cursor_is_spliced_at_position() {
        let mut input = LineInput::new("abc");
        input.move_left();
        assert_eq!(with_cursor(&input), "ab\u{258C}c");
    }

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect_fixed(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_rect_fixed(40, 40, area), area);
    }
}
