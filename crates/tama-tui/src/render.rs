use std::time::{Duration, Instant};

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tama_core::{Activity, Mode, Session, StatusLevel, Turn};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::editor::ComposeEditor;
use crate::keybindings::keybinding_label;
use crate::markdown::markdown_lines;
use crate::{TuiOptions, TuiTheme};

const INPUT_MAX_HEIGHT: u16 = 8;
const EMPTY_SESSION_HINT: &str = "No messages yet. Type a prompt and press enter to send.";

/// Everything outside the session that a frame depends on.
pub(crate) struct FrameContext<'a> {
    pub(crate) editor: &'a ComposeEditor,
    pub(crate) options: &'a TuiOptions,
    pub(crate) pending_prefix: bool,
    pub(crate) now: Instant,
}

pub(crate) fn render_ui(frame: &mut Frame, session: &mut Session, context: &FrameContext<'_>) {
    let options = context.options;
    let theme = options.theme;
    let area = frame.area();
    let input_prompt = theme.input_prompt();

    let input_height = match session.mode() {
        Mode::Compose => input_area_height(context.editor.text(), area, input_prompt),
        Mode::Review => 1,
    };
    let message_height = u16::from(session.status().is_some());
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(input_height),
            Constraint::Length(1),
            Constraint::Length(message_height),
        ])
        .split(area);
    let (header_area, turn_area, input_area, footer_area, message_area) =
        (areas[0], areas[1], areas[2], areas[3], areas[4]);

    let header = Paragraph::new(Line::from(Span::styled(
        header_rule(&options.app_name, &options.version, header_area.width as usize),
        theme.header_style(),
    )))
    .style(theme.transcript_style());
    frame.render_widget(header, header_area);

    let turn_area = centered_column(turn_area, options.content_width);
    let content_width = turn_area.width.saturating_sub(1) as usize;
    let lines = turn_lines(session, content_width, theme);
    session
        .navigator_mut()
        .relayout(turn_area.height as usize, lines.len());
    let offset = session.navigator().offset().min(u16::MAX as usize) as u16;
    let turn_view = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::NONE))
        .scroll((offset, 0))
        .style(theme.transcript_style());
    frame.render_widget(turn_view, indent(turn_area));

    match session.mode() {
        Mode::Compose => {
            let input_text = format!("{input_prompt}{}", context.editor.text());
            let (cursor_x, cursor_y, scroll) =
                input_cursor_layout(context.editor, input_area, input_prompt);
            let input = Paragraph::new(input_text)
                .block(
                    Block::default()
                        .borders(Borders::TOP | Borders::BOTTOM)
                        .border_style(theme.input_border_style()),
                )
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0))
                .style(theme.input_style());
            frame.render_widget(input, input_area);
            frame.set_cursor_position((cursor_x, cursor_y));
        }
        Mode::Review => {
            let hint = Paragraph::new(Line::from(Span::styled(
                review_hint(session, options, context.pending_prefix),
                theme.muted_style(),
            )))
            .style(theme.transcript_style());
            frame.render_widget(hint, indent(input_area));
        }
    }

    let (left, right) = status_line_parts(session, context.now);
    let footer_width = footer_area.width as usize;
    let footer = Paragraph::new(Line::from(vec![
        Span::raw(left.clone()),
        Span::raw(status_gap(&left, &right, footer_width)),
        Span::styled(right, theme.activity_style()),
    ]))
    .style(theme.footer_style());
    frame.render_widget(footer, footer_area);

    if let Some(status) = session.status() {
        let message = Paragraph::new(Line::from(Span::styled(
            status.text.clone(),
            theme.status_style(status.level),
        )))
        .style(theme.transcript_style());
        frame.render_widget(message, indent(message_area));
    }
}

/// Caps `area` at `max_width` columns and centers what is left.
pub(crate) fn centered_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    Rect {
        x: area.x.saturating_add((area.width - width) / 2),
        width,
        ..area
    }
}

fn indent(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        width: area.width.saturating_sub(1),
        ..area
    }
}

pub(crate) fn header_rule(app_name: &str, version: &str, width: usize) -> String {
    let title = if version.trim().is_empty() {
        app_name.to_ascii_uppercase()
    } else {
        format!("{} v{}", app_name.to_ascii_uppercase(), version.trim())
    };
    let title_width = UnicodeWidthStr::width(title.as_str());
    if title_width + 1 >= width {
        return title;
    }
    format!("{title} {}", "─".repeat(width - title_width - 1))
}

/// Wrapped lines for the displayed turn.
pub(crate) fn turn_lines(session: &Session, width: usize, theme: TuiTheme) -> Vec<Line<'static>> {
    let store = session.store();
    let (Some(index), Some(turn)) = (store.current_index(), store.current()) else {
        return vec![Line::from(Span::styled(EMPTY_SESSION_HINT, theme.muted_style()))];
    };

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled("Request", theme.request_header_style())));
    push_wrapped(&mut lines, turn.request(), width, None);
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        response_header(turn),
        theme.response_header_style(),
    )));

    if let Some(cause) = turn.failure() {
        push_wrapped(
            &mut lines,
            cause,
            width,
            Some(theme.status_style(StatusLevel::Error)),
        );
    } else if turn.is_pending() {
        let streaming = store.target_index() == Some(index) && !store.accumulator().is_empty();
        if streaming {
            lines.extend(markdown_lines(store.accumulator(), width, theme));
        } else {
            lines.push(Line::from(Span::styled("Waiting...", theme.muted_style())));
        }
    } else if turn.response().is_empty() {
        lines.push(Line::from(Span::styled("(no response)", theme.muted_style())));
    } else {
        lines.extend(markdown_lines(turn.response(), width, theme));
    }

    if let Some(reason) = turn.truncated() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("[response truncated: {reason}]"),
            theme.muted_style(),
        )));
    }
    lines
}

fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    text: &str,
    width: usize,
    style: Option<Style>,
) {
    for segment in wrap_text_by_display_width(text, width) {
        lines.push(match style {
            Some(style) => Line::from(Span::styled(segment, style)),
            None => Line::from(segment),
        });
    }
}

pub(crate) fn response_header(turn: &Turn) -> String {
    if turn.failure().is_some() {
        return "Response (failed)".to_string();
    }
    if turn.is_cancelled() {
        return "Response (cancelled)".to_string();
    }
    match turn.duration() {
        Some(duration) => format!("Response ({})", format_elapsed(duration)),
        None => "Response".to_string(),
    }
}

pub(crate) fn format_elapsed(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

pub(crate) fn status_line_parts(session: &Session, now: Instant) -> (String, String) {
    let availability = session.availability();
    let mut left = format!("Model: {}", availability.name());
    if !availability.is_loaded() {
        left.push_str(" (not loaded)");
    }
    let store = session.store();
    let position = store.current_index().map_or(0, |index| index + 1);
    left.push_str(&format!(" • MSG {position}/{}", store.len()));

    let right = match session.activity(now) {
        Some(Activity::LoadingModel(elapsed)) => {
            format!("⏱ Loading model: {}", format_elapsed(elapsed))
        }
        Some(Activity::WaitingForResponse(elapsed)) => {
            format!("⏱ Waiting for response: {}", format_elapsed(elapsed))
        }
        None => String::new(),
    };
    (format!(" {left}"), right)
}

fn status_gap(left: &str, right: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(left) + UnicodeWidthStr::width(right);
    if right.is_empty() || used >= width {
        return " ".to_string();
    }
    " ".repeat(width - used)
}

pub(crate) fn review_hint(session: &Session, options: &TuiOptions, pending_prefix: bool) -> String {
    let keys = &options.keybindings;
    if session.is_dispatch_active() {
        return format!(
            "waiting for response, {} to cancel",
            keybinding_label(&keys.interrupt)
        );
    }
    if pending_prefix {
        return format!("{}…", keybinding_label(&keys.scroll_top));
    }
    format!(
        "{} compose • {}/{} turns • {}/{} scroll • {} quit",
        keybinding_label(&keys.enter_compose),
        keybinding_label(&keys.next_turn),
        keybinding_label(&keys.previous_turn),
        keybinding_label(&keys.scroll_down),
        keybinding_label(&keys.scroll_up),
        keybinding_label(&keys.terminate),
    )
}

fn input_area_height(input: &str, frame_area: Rect, input_prompt: &str) -> u16 {
    // Top and bottom borders only.
    let display_input = format!("{input_prompt}{input}");
    let line_count = wrap_text_by_display_width(&display_input, frame_area.width as usize)
        .len()
        .max(1);
    let desired_height = line_count.saturating_add(2).min(u16::MAX as usize) as u16;
    let max_height = INPUT_MAX_HEIGHT.min(frame_area.height.saturating_sub(3)).max(3);
    desired_height.clamp(3, max_height)
}

fn input_cursor_layout(
    editor: &ComposeEditor,
    input_area: Rect,
    input_prompt: &str,
) -> (u16, u16, u16) {
    let inner_width = input_area.width as usize;
    let inner_height = input_area.height.saturating_sub(2) as usize;
    if inner_width == 0 || inner_height == 0 {
        let fallback_y = input_area
            .y
            .saturating_add(input_area.height.saturating_sub(1));
        return (input_area.x, fallback_y, 0);
    }

    let (row, col) =
        input_cursor_row_col(editor.text(), editor.cursor_pos(), inner_width, input_prompt);
    let scroll = row.saturating_sub(inner_height.saturating_sub(1));
    let visible_row = row
        .saturating_sub(scroll)
        .min(inner_height.saturating_sub(1));

    let max_x_offset = input_area.width.saturating_sub(1);
    let x = input_area.x.saturating_add((col as u16).min(max_x_offset));
    let y = input_area.y.saturating_add(1).saturating_add(visible_row as u16);

    (x, y, scroll as u16)
}

fn advance_cursor_row_col(row: &mut usize, col: &mut usize, ch: char, max_width: usize) {
    if ch == '\n' {
        *row = row.saturating_add(1);
        *col = 0;
        return;
    }

    let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
    if ch_width == 0 {
        return;
    }

    if *col > 0 && *col + ch_width > max_width {
        *row = row.saturating_add(1);
        *col = 0;
    }

    *col += ch_width;
    if *col >= max_width {
        *row = row.saturating_add(1);
        *col = 0;
    }
}

pub(crate) fn input_cursor_row_col(
    input: &str,
    cursor_pos: usize,
    max_width: usize,
    input_prompt: &str,
) -> (usize, usize) {
    if max_width == 0 {
        return (0, 0);
    }

    let mut row = 0usize;
    let mut col = 0usize;
    for ch in input_prompt.chars().chain(input.chars().take(cursor_pos)) {
        advance_cursor_row_col(&mut row, &mut col, ch, max_width);
    }
    (row, col)
}

pub(crate) fn wrap_text_by_display_width(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        if raw_line.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0usize;

        for ch in raw_line.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if current_width > 0 && current_width + ch_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            current.push(ch);
            current_width += ch_width;

            if current_width >= max_width && ch_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
