use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::prd::{content_preview, estimate_feature_count, is_submit_ready};
use crate::tui::app::{App, EditTarget, Mode, PrdField};
use crate::util::unicode;

use super::with_cursor;

const LABEL_W: usize = 10;

/// Render the PRD input page
pub fn render_prd_view(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let text = Style::default().fg(theme.text).bg(bg);
    let bright = Style::default().fg(theme.text_bright).bg(bg);
    let width = area.width as usize;
    let editing = match (app.mode, app.edit_target) {
        (Mode::Edit, EditTarget::Prd(field)) => Some(field),
        _ => None,
    };
    let prd = &app.prd;
    let manual = prd.source.is_manual();

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    // Title
    let title = if editing == Some(PrdField::Title) {
        Span::styled(with_cursor(&app.input), bright)
    } else if prd.title.is_empty() {
        Span::styled("(untitled)", dim)
    } else {
        Span::styled(prd.title.clone(), bright)
    };
    lines.push(field_line(app, PrdField::Title, "Title", vec![title]));

    // Source
    let source = vec![
        Span::styled(prd.source.label(), Style::default().fg(theme.purple).bg(bg)),
        Span::styled("  (m to switch)", dim),
    ];
    lines.push(field_line(app, PrdField::Source, "Source", source));

    // Body: manual text, or the page URL
    let body_label = if manual { "PRD text" } else { "Page URL" };
    if editing == Some(PrdField::Body) {
        let buffer = with_cursor(&app.input);
        let mut body = buffer.split('\n');
        let first = body.next().unwrap_or_default().to_string();
        lines.push(field_line(
            app,
            PrdField::Body,
            body_label,
            vec![Span::styled(first, bright)],
        ));
        for rest in body {
            lines.push(indented(rest.to_string(), bright));
        }
    } else if manual {
        let mut body = prd.manual_content.lines();
        let first = match body.next() {
            Some(line) => Span::styled(line.to_string(), text),
            None => Span::styled("(empty: press e to write)", dim),
        };
        lines.push(field_line(app, PrdField::Body, body_label, vec![first]));
        for rest in body.take(8) {
            lines.push(indented(rest.to_string(), text));
        }
        let hidden = prd.manual_content.lines().count().saturating_sub(9);
        if hidden > 0 {
            lines.push(indented(format!("... {} more lines", hidden), dim));
        }
    } else {
        let url = if prd.confluence_url.is_empty() {
            Span::styled("(none)", dim)
        } else {
            Span::styled(prd.confluence_url.clone(), text)
        };
        lines.push(field_line(app, PrdField::Body, body_label, vec![url]));
        if prd.fetched_content.is_none() {
            lines.push(indented(
                "page fetching is not available; use `bridge prd submit --confluence-url`".into(),
                dim,
            ));
        }
    }

    // Estimate and preview
    let content = prd.content();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(format!(" {:<w$}", "Features", w = LABEL_W), dim),
        Span::styled(
            format!("~{}", estimate_feature_count(content)),
            Style::default().fg(theme.cyan).bg(bg),
        ),
    ]));
    if !content.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" {:<w$}", "Preview", w = LABEL_W),
            dim,
        )));
        let preview = content_preview(content).replace('\n', " ");
        let wrap = width.saturating_sub(LABEL_W + 2).max(1);
        for chunk in chunk_by_width(&preview, wrap) {
            lines.push(indented(chunk, dim));
        }
    }

    // Submit hint
    lines.push(Line::from(""));
    let (hint, color) = if app.submitting {
        ("submitting...", theme.yellow)
    } else if is_submit_ready(prd) {
        ("ready: press S to create the project", theme.green)
    } else {
        ("not ready: a title and PRD text are required", theme.dim)
    };
    lines.push(Line::from(vec![
        Span::styled(" ".repeat(LABEL_W + 1), dim),
        Span::styled(hint, Style::default().fg(color).bg(bg)),
    ]));

    let page = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(page, area);
}

/// ` Label     value`, with the label highlighted when focused
fn field_line<'a>(app: &App, field: PrdField, label: &str, value: Vec<Span<'a>>) -> Line<'a> {
    let theme = &app.theme;
    let label_style = if app.prd_focus == field {
        Style::default()
            .fg(theme.text_bright)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim).bg(theme.background)
    };
    let marker = if app.prd_focus == field {
        Span::styled(
            "\u{258E}",
            Style::default().fg(theme.selection_border).bg(theme.background),
        )
    } else {
        Span::styled(" ", Style::default().bg(theme.background))
    };
    let mut spans = vec![
        marker,
        Span::styled(format!("{:<w$}", label, w = LABEL_W), label_style),
    ];
    spans.extend(value);
    Line::from(spans)
}

fn indented<'a>(text: String, style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(" ".repeat(LABEL_W + 1), style),
        Span::styled(text, style),
    ])
}

/// Split `s` into pieces of at most `width` cells
fn chunk_by_width(s: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = unicode::display_width(c.encode_utf8(&mut [0; 4]));
        if used + w > width && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
