use chrono::{NaiveDate, TimeDelta};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::gantt::GanttTask;
use crate::ops::gantt::{GanttView, SCALES, Scale, TimeUnit, WEEKEND_CLASS, highlight};
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::unicode;

/// Terminal cells per day
const DAY_W: usize = 3;
/// Upper bound for the task name column
const NAME_W: usize = 24;

/// Render the gantt page: scale headers, one bar per row, legend
pub fn render_gantt_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let Some(gantt) = app.gantt.as_ref() else {
        let msg = if app.project.is_none() {
            " No project yet. Submit a PRD on the PRD tab (1)."
        } else if app.generating {
            " Generating gantt chart..."
        } else if app.loading_gantt {
            " Loading gantt chart..."
        } else {
            " No chart loaded. Press g to generate one."
        };
        frame.render_widget(Paragraph::new(msg).style(dim), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let width = chunks[0].width as usize;
    let name_w = NAME_W.min(width / 3);
    let days = width.saturating_sub(name_w + 1) / DAY_W;
    let first = gantt.start + TimeDelta::days(app.gantt_col_offset as i64);
    let dates: Vec<NaiveDate> = (0..days as i64).map(|i| first + TimeDelta::days(i)).collect();

    let mut lines: Vec<Line> = Vec::new();
    for scale in &SCALES {
        lines.push(scale_line(&app.theme, scale, &dates, name_w));
    }

    if gantt.tasks.is_empty() {
        lines.push(Line::from(Span::styled(" No tasks on the chart.", dim)));
    }
    let visible = (chunks[0].height as usize).saturating_sub(SCALES.len());
    for task in gantt.tasks.iter().skip(app.gantt_row_offset).take(visible) {
        lines.push(task_line(&app.theme, task, &dates, name_w));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), chunks[0]);
    frame.render_widget(
        Paragraph::new(legend_line(&app.theme, gantt)).style(Style::default().bg(bg)),
        chunks[1],
    );
}

/// One header row; a label starts where a cell of the scale begins and on
/// the first visible column.
fn scale_line<'a>(theme: &Theme, scale: &Scale, dates: &[NaiveDate], name_w: usize) -> Line<'a> {
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let mut spans = vec![
        Span::styled(" ".repeat(name_w), dim),
        Span::styled("\u{2502}", dim),
    ];

    if scale.unit == TimeUnit::Day {
        for date in dates {
            let style = if highlight(*date, scale.unit) == WEEKEND_CLASS {
                Style::default().fg(theme.dim).bg(theme.weekend_bg)
            } else {
                Style::default().fg(theme.text).bg(bg)
            };
            spans.push(Span::styled(
                format!("{:<w$}", scale.label(*date), w = DAY_W),
                style,
            ));
        }
        return Line::from(spans);
    }

    let starts: Vec<usize> = dates
        .iter()
        .enumerate()
        .filter(|(i, d)| *i == 0 || scale.starts_cell(**d))
        .map(|(i, _)| i)
        .collect();
    let style = Style::default()
        .fg(theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let mut cell = 0;
    for (n, &start) in starts.iter().enumerate() {
        if start > cell {
            spans.push(Span::styled(" ".repeat((start - cell) * DAY_W), dim));
        }
        let next = starts.get(n + 1).copied().unwrap_or(dates.len());
        let room = (next - start) * DAY_W;
        let label = unicode::truncate_to_width(&scale.label(dates[start]), room.saturating_sub(1));
        spans.push(Span::styled(unicode::fit_width(&label, room), style));
        cell = next;
    }
    Line::from(spans)
}

fn task_line<'a>(theme: &Theme, task: &GanttTask, dates: &[NaiveDate], name_w: usize) -> Line<'a> {
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let name = match &task.text {
        Some(text) => text.clone(),
        None => task.id.to_string(),
    };
    let indent = if task.parent.is_some() { "  " } else { "" };
    let mut spans = vec![
        Span::styled(
            unicode::fit_width(&format!(" {}{}", indent, name), name_w),
            Style::default().fg(theme.text).bg(bg),
        ),
        Span::styled("\u{2502}", dim),
    ];

    let end = task.end.unwrap_or(task.start);
    let length = (end - task.start).num_days().max(0);
    let progress = task.progress.unwrap_or(0.0).clamp(0.0, 100.0);
    let done = (length as f64 * progress / 100.0).round() as i64;
    let color = theme.user_color(task.kind.as_deref());

    for date in dates {
        let cell_bg = if highlight(*date, TimeUnit::Day) == WEEKEND_CLASS {
            theme.weekend_bg
        } else {
            bg
        };
        let offset = (*date - task.start).num_days();
        let span = if length == 0 && offset == 0 {
            Span::styled(" \u{25C6} ", Style::default().fg(color).bg(cell_bg))
        } else if (0..length).contains(&offset) {
            let glyph = if offset < done { "\u{2588}" } else { "\u{2592}" };
            Span::styled(glyph.repeat(DAY_W), Style::default().fg(color).bg(cell_bg))
        } else if in_baseline(task, *date) {
            Span::styled(
                "\u{2581}".repeat(DAY_W),
                Style::default().fg(theme.dim).bg(cell_bg),
            )
        } else {
            Span::styled(" ".repeat(DAY_W), Style::default().bg(cell_bg))
        };
        spans.push(span);
    }
    Line::from(spans)
}

fn in_baseline(task: &GanttTask, date: NaiveDate) -> bool {
    let Some(start) = task.base_start else {
        return false;
    };
    let end = match (task.base_end, task.base_duration) {
        (Some(end), _) => end,
        (None, Some(days)) => start + TimeDelta::days(days),
        (None, None) => return false,
    };
    start <= date && date < end
}

fn legend_line<'a>(theme: &Theme, gantt: &GanttView) -> Line<'a> {
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let mut spans = vec![Span::styled(" ", dim)];
    for entry in &gantt.task_types {
        spans.push(Span::styled(
            "\u{25A0} ",
            Style::default().fg(theme.user_color(Some(&entry.id))).bg(bg),
        ));
        spans.push(Span::styled(
            format!("{}  ", entry.label),
            Style::default().fg(theme.text).bg(bg),
        ));
    }
    spans.push(Span::styled(
        format!(
            "{} to {}  \u{2502}  {} links",
            gantt.start.format("%b %-d"),
            gantt.end.format("%b %-d"),
            gantt.links.len()
        ),
        dim,
    ));
    Line::from(spans)
}
