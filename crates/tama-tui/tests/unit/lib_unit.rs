use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::Terminal;
use tama_ai::{Completion, DispatchEvent, StreamEnd};
use tama_core::{Command, Effect, Mode};

use super::*;
use crate::editor::ComposeEditor;
use crate::keymap::{KeyMap, KeyOutcome};
use crate::markdown::markdown_lines;
use crate::render::{
    FrameContext, centered_column, format_elapsed, header_rule, input_cursor_row_col, render_ui, response_header,
    review_hint, status_line_parts, turn_lines, wrap_text_by_display_width,
};

fn line_text(line: &Line<'_>) -> String {
    line.spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect()
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

fn type_text(editor: &mut ComposeEditor, text: &str) {
    for ch in text.chars() {
        assert!(editor.handle_key(press(KeyCode::Char(ch))));
    }
}

fn submit(session: &mut Session, text: &str) -> tama_core::DispatchRequest {
    if session.mode() == Mode::Review {
        session
            .handle(Command::EnterCompose, Instant::now())
            .expect("compose");
    }
    session
        .handle(Command::SubmitText(text.to_string()), Instant::now())
        .expect("submit")
        .into_iter()
        .find_map(|effect| match effect {
            Effect::Dispatch(request) => Some(request),
            _ => None,
        })
        .expect("dispatch effect")
}

fn finish(session: &mut Session, request: &tama_core::DispatchRequest, text: &str) {
    session.on_dispatch_event(
        request.id,
        request.target,
        DispatchEvent::Complete(Completion {
            text: text.to_string(),
            elapsed: Duration::from_millis(1200),
            end: StreamEnd::Finished,
        }),
        Instant::now(),
    );
}

fn screen_text(session: &mut Session, editor: &ComposeEditor, width: u16, height: u16) -> String {
    let options = TuiOptions::default();
    let context = FrameContext {
        editor,
        options: &options,
        pending_prefix: false,
        now: Instant::now(),
    };
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
    terminal
        .draw(|frame| render_ui(frame, session, &context))
        .expect("draw");
    let buffer = terminal.backend().buffer().clone();
    let mut text = String::new();
    for y in 0..height {
        for x in 0..width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[test]
fn editor_inserts_at_cursor_and_edits_words() {
    let mut editor = ComposeEditor::new();
    type_text(&mut editor, "hello world");
    assert_eq!(editor.cursor_pos(), 11);

    assert!(editor.handle_key(ctrl('w')));
    assert_eq!(editor.text(), "hello ");

    assert!(editor.handle_key(ctrl('a')));
    type_text(&mut editor, ">");
    assert_eq!(editor.text(), ">hello ");

    assert!(editor.handle_key(ctrl('k')));
    assert_eq!(editor.text(), ">");
    assert!(!editor.handle_key(ctrl('k')));
}

#[test]
fn editor_handles_multibyte_text() {
    let mut editor = ComposeEditor::new();
    type_text(&mut editor, "héllo");
    assert!(editor.handle_key(press(KeyCode::Left)));
    assert!(editor.handle_key(press(KeyCode::Left)));
    assert!(editor.handle_key(press(KeyCode::Backspace)));
    assert_eq!(editor.text(), "hélo");
    assert!(editor.handle_key(ctrl('u')));
    assert_eq!(editor.text(), "lo");
    assert_eq!(editor.cursor_pos(), 0);
    assert!(!editor.handle_key(press(KeyCode::Backspace)));
}

#[test]
fn editor_take_empties_the_buffer() {
    let mut editor = ComposeEditor::new();
    editor.insert_text("line one\nline two");
    assert_eq!(editor.take(), "line one\nline two");
    assert!(editor.text().is_empty());
    assert_eq!(editor.cursor_pos(), 0);
}

#[test]
fn compose_table_routes_enter_escape_and_text() {
    let mut keymap = KeyMap::new(&TuiKeyBindings::default());
    let mut editor = ComposeEditor::new();

    assert_eq!(
        keymap.dispatch(Mode::Compose, press(KeyCode::Enter), &mut editor),
        KeyOutcome::Ignored
    );
    assert_eq!(
        keymap.dispatch(Mode::Compose, press(KeyCode::Char('j')), &mut editor),
        KeyOutcome::Redraw
    );
    assert_eq!(
        keymap.dispatch(
            Mode::Compose,
            KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT),
            &mut editor
        ),
        KeyOutcome::Redraw
    );
    assert_eq!(editor.text(), "j\n");
    assert_eq!(
        keymap.dispatch(Mode::Compose, press(KeyCode::Enter), &mut editor),
        KeyOutcome::Command(Command::SubmitText("j\n".to_string()))
    );
    assert!(editor.text().is_empty());
    assert_eq!(
        keymap.dispatch(Mode::Compose, press(KeyCode::Esc), &mut editor),
        KeyOutcome::Command(Command::ExitCompose)
    );
    assert_eq!(
        keymap.dispatch(Mode::Compose, ctrl('c'), &mut editor),
        KeyOutcome::Command(Command::Interrupt)
    );
}

#[test]
fn review_table_never_edits_text() {
    let mut keymap = KeyMap::new(&TuiKeyBindings::default());
    let mut editor = ComposeEditor::new();

    assert_eq!(
        keymap.dispatch(Mode::Review, press(KeyCode::Char('j')), &mut editor),
        KeyOutcome::Command(Command::ScrollBy(1))
    );
    assert_eq!(
        keymap.dispatch(
            Mode::Review,
            KeyEvent::new(KeyCode::Char('J'), KeyModifiers::SHIFT),
            &mut editor
        ),
        KeyOutcome::Command(Command::NavigateNext)
    );
    assert_eq!(
        keymap.dispatch(Mode::Review, press(KeyCode::Char('K')), &mut editor),
        KeyOutcome::Command(Command::NavigatePrevious)
    );
    assert_eq!(
        keymap.dispatch(Mode::Review, press(KeyCode::PageDown), &mut editor),
        KeyOutcome::Command(Command::ScrollPage(1))
    );
    assert_eq!(
        keymap.dispatch(Mode::Review, press(KeyCode::Char('i')), &mut editor),
        KeyOutcome::Command(Command::EnterCompose)
    );
    assert_eq!(
        keymap.dispatch(Mode::Review, press(KeyCode::Char('x')), &mut editor),
        KeyOutcome::Ignored
    );
    assert!(editor.text().is_empty());
}

#[test]
fn gg_needs_two_presses_and_other_keys_cancel_it() {
    let mut keymap = KeyMap::new(&TuiKeyBindings::default());
    let mut editor = ComposeEditor::new();
    let g = press(KeyCode::Char('g'));

    assert_eq!(keymap.dispatch(Mode::Review, g, &mut editor), KeyOutcome::Redraw);
    assert!(keymap.has_pending_prefix());
    assert_eq!(
        keymap.dispatch(Mode::Review, g, &mut editor),
        KeyOutcome::Command(Command::ScrollTop)
    );
    assert!(!keymap.has_pending_prefix());

    keymap.dispatch(Mode::Review, g, &mut editor);
    assert_eq!(
        keymap.dispatch(Mode::Review, press(KeyCode::Char('k')), &mut editor),
        KeyOutcome::Command(Command::ScrollBy(-1))
    );
    assert_eq!(keymap.dispatch(Mode::Review, g, &mut editor), KeyOutcome::Redraw);
    assert_eq!(
        keymap.dispatch(
            Mode::Review,
            KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT),
            &mut editor
        ),
        KeyOutcome::Command(Command::ScrollBottom)
    );
}

#[test]
fn wrap_text_respects_display_width() {
    assert_eq!(
        wrap_text_by_display_width("abcdef", 4),
        vec!["abcd".to_string(), "ef".to_string()]
    );
    assert_eq!(
        wrap_text_by_display_width("你好世界", 4),
        vec!["你好".to_string(), "世界".to_string()]
    );
    assert_eq!(
        wrap_text_by_display_width("a\n\nb", 10),
        vec!["a".to_string(), String::new(), "b".to_string()]
    );
}

#[test]
fn cursor_position_counts_prompt_and_wraps() {
    assert_eq!(input_cursor_row_col("hello", 5, 20, "> "), (0, 7));
    assert_eq!(input_cursor_row_col("abcdef", 6, 4, "> "), (2, 0));
    assert_eq!(input_cursor_row_col("ab\ncd", 4, 20, "> "), (1, 1));
}

#[test]
fn header_rule_fills_the_width() {
    let rule = header_rule("tama", "", 10);
    assert_eq!(rule, "TAMA ─────");
    assert_eq!(header_rule("tama", "0.1.0", 4), "TAMA v0.1.0");
}

#[test]
fn empty_session_shows_a_hint() {
    let session = Session::new("llama3");
    let lines = turn_lines(&session, 80, TuiTheme::Dark);
    assert_eq!(lines.len(), 1);
    assert!(line_text(&lines[0]).starts_with("No messages yet"));
}

#[test]
fn pending_turn_shows_waiting_then_streamed_text() {
    let mut session = Session::new("llama3");
    let request = submit(&mut session, "Hi");

    let lines: Vec<String> = turn_lines(&session, 80, TuiTheme::Dark)
        .iter()
        .map(line_text)
        .collect();
    assert_eq!(lines, vec!["Request", "Hi", "", "Response", "Waiting..."]);

    session.on_dispatch_event(
        request.id,
        request.target,
        DispatchEvent::Partial("Hel".to_string()),
        Instant::now(),
    );
    let lines: Vec<String> = turn_lines(&session, 80, TuiTheme::Dark)
        .iter()
        .map(line_text)
        .collect();
    assert_eq!(lines.last().map(String::as_str), Some("Hel"));
}

#[test]
fn streaming_text_only_shows_on_the_target_turn() {
    let mut session = Session::new("llama3");
    let first = submit(&mut session, "one");
    finish(&mut session, &first, "uno");
    let second = submit(&mut session, "two");
    session.on_dispatch_event(
        second.id,
        second.target,
        DispatchEvent::Partial("do".to_string()),
        Instant::now(),
    );
    session
        .handle(Command::NavigatePrevious, Instant::now())
        .expect("previous");

    let lines: Vec<String> = turn_lines(&session, 80, TuiTheme::Dark)
        .iter()
        .map(line_text)
        .collect();
    assert_eq!(lines, vec!["Request", "one", "", "Response (1.2s)", "uno"]);
}

#[test]
fn response_headers_describe_how_a_turn_ended() {
    let mut session = Session::new("llama3");
    let request = submit(&mut session, "Hi");
    finish(&mut session, &request, "Hello");
    assert_eq!(
        response_header(session.store().get(0).expect("turn")),
        "Response (1.2s)"
    );

    session.handle(Command::EnterCompose, Instant::now()).expect("compose");
    submit(&mut session, "again");
    session.handle(Command::Interrupt, Instant::now()).expect("interrupt");
    assert_eq!(
        response_header(session.store().get(1).expect("turn")),
        "Response (cancelled)"
    );

    session.handle(Command::EnterCompose, Instant::now()).expect("compose");
    let failed = submit(&mut session, "third");
    session.on_dispatch_event(
        failed.id,
        failed.target,
        DispatchEvent::Failure("failed to send request: refused".to_string()),
        Instant::now(),
    );
    assert_eq!(
        response_header(session.store().get(2).expect("turn")),
        "Response (failed)"
    );
    let lines: Vec<String> = turn_lines(&session, 80, TuiTheme::Dark)
        .iter()
        .map(line_text)
        .collect();
    assert_eq!(lines.last().map(String::as_str), Some("failed to send request: refused"));
}

#[test]
fn status_line_reports_model_position_and_timer() {
    let start = Instant::now();
    let mut session = Session::new("llama3");
    let (left, right) = status_line_parts(&session, start);
    assert_eq!(left, " Model: llama3 (not loaded) • MSG 0/0");
    assert_eq!(right, "");

    session
        .handle(Command::SubmitText("Hi".to_string()), start)
        .expect("submit");
    let (left, right) = status_line_parts(&session, start + Duration::from_millis(1200));
    assert_eq!(left, " Model: llama3 (not loaded) • MSG 1/1");
    assert_eq!(right, "⏱ Loading model: 1.2s");

    session.on_model_status(Ok(true), start + Duration::from_secs(2));
    let (left, right) = status_line_parts(&session, start + Duration::from_millis(5400));
    assert_eq!(left, " Model: llama3 • MSG 1/1");
    assert_eq!(right, "⏱ Waiting for response: 3.4s");
}

#[test]
fn review_hint_switches_while_waiting() {
    let options = TuiOptions::default();
    let mut session = Session::new("llama3");
    submit(&mut session, "Hi");
    assert_eq!(
        review_hint(&session, &options, false),
        "waiting for response, ctrl+c to cancel"
    );
    session.handle(Command::Interrupt, Instant::now()).expect("interrupt");
    assert!(review_hint(&session, &options, false).starts_with("i compose"));
    assert_eq!(review_hint(&session, &options, true), "g…");
}

#[test]
fn format_elapsed_uses_one_decimal() {
    assert_eq!(format_elapsed(Duration::from_millis(1249)), "1.2s");
    assert_eq!(format_elapsed(Duration::ZERO), "0.0s");
}

#[test]
fn frame_reports_viewport_to_the_navigator() {
    let mut session = Session::new("llama3");
    let request = submit(&mut session, "Hi");
    let long_reply = (0..40)
        .map(|index| format!("line {index}"))
        .collect::<Vec<_>>()
        .join("\n");
    finish(&mut session, &request, &long_reply);

    let editor = ComposeEditor::new();
    let screen = screen_text(&mut session, &editor, 60, 12);
    assert!(screen.starts_with("TAMA ───"));
    assert!(screen.contains("Response (1.2s)"));
    assert!(screen.contains("Model: llama3"));
    // header, hint and status rows are chrome
    assert_eq!(session.navigator().viewport_height(), 9);

    session.handle(Command::ScrollBottom, Instant::now()).expect("bottom");
    let screen = screen_text(&mut session, &editor, 60, 12);
    assert!(screen.contains("line 39"));
    assert!(!screen.contains("Request"));

    // Taller terminal: still pinned to the bottom.
    screen_text(&mut session, &editor, 60, 20);
    assert!(session.navigator().is_at_bottom());
    assert_eq!(session.navigator().viewport_height(), 17);
}

#[test]
fn compose_frame_shows_the_prompt() {
    let mut session = Session::new("llama3");
    let mut editor = ComposeEditor::new();
    type_text(&mut editor, "draft");
    let screen = screen_text(&mut session, &editor, 40, 10);
    assert!(screen.contains("> draft"));
    assert!(screen.contains("No messages yet"));
}

#[test]
fn markdown_response_renders_styled_lines_without_markers() {
    let mut session = Session::new("llama3");
    let request = submit(&mut session, "explain");
    finish(
        &mut session,
        &request,
        "Use *care* and **force**.\n\n```rust\nfn main() {}\n```\n\n- `one`\n- two",
    );

    let theme = TuiTheme::Dark;
    let lines = turn_lines(&session, 80, theme);
    let texts: Vec<String> = lines.iter().map(line_text).collect();
    assert_eq!(
        texts,
        vec![
            "Request",
            "explain",
            "",
            "Response (1.2s)",
            "Use care and force.",
            "",
            "  fn main() {}",
            "",
            "• one",
            "• two",
        ]
    );
    assert!(texts.iter().all(|text| !text.contains('*') && !text.contains('`')));

    let span_style = |content: &str| {
        lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .find(|span| span.content == content)
            .map(|span| span.style)
            .unwrap_or_else(|| panic!("no span {content:?}"))
    };
    assert!(span_style("care").add_modifier.contains(Modifier::ITALIC));
    assert!(span_style("force").add_modifier.contains(Modifier::BOLD));
    assert_eq!(span_style("  fn main() {}"), theme.code_style());
    assert_eq!(span_style("one"), theme.code_style());
}

#[test]
fn markdown_keeps_single_newlines_and_drops_heading_marks() {
    let theme = TuiTheme::Dark;
    let lines = markdown_lines("## Steps\nfirst\nsecond\n\n1. a\n2. b", 80, theme);
    let texts: Vec<String> = lines.iter().map(line_text).collect();
    assert_eq!(texts, vec!["Steps", "", "first", "second", "", "1. a", "2. b"]);
    assert_eq!(lines[0].spans[0].style, theme.header_style());
}

#[test]
fn markdown_wraps_list_items_under_their_marker() {
    let lines = markdown_lines("- abcdefgh", 6, TuiTheme::Dark);
    let texts: Vec<String> = lines.iter().map(line_text).collect();
    assert_eq!(texts, vec!["• abcd", "  efgh"]);
}

#[test]
fn unterminated_fence_still_renders_as_code() {
    let theme = TuiTheme::Dark;
    let lines = markdown_lines("```\nlet x = 1;", 80, theme);
    let texts: Vec<String> = lines.iter().map(line_text).collect();
    assert_eq!(texts, vec!["  let x = 1;"]);
    assert_eq!(lines[0].spans[0].style, theme.code_style());
}

#[test]
fn turn_column_is_centered_on_wide_terminals() {
    let area = Rect::new(0, 1, 140, 10);
    assert_eq!(centered_column(area, 100), Rect::new(20, 1, 100, 10));
    assert_eq!(centered_column(Rect::new(0, 1, 60, 10), 100), Rect::new(0, 1, 60, 10));

    let mut session = Session::new("llama3");
    let request = submit(&mut session, "Hi");
    finish(&mut session, &request, "Hello");
    let editor = ComposeEditor::new();
    let screen = screen_text(&mut session, &editor, 140, 12);
    let first_turn_row = screen.lines().nth(1).expect("turn row");
    assert_eq!(first_turn_row.find("Request"), Some(21));
}
