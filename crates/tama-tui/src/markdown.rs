//! Renders assistant replies as styled terminal lines.
//!
//! Markers (`*`, `**`, backticks, fences, `#`) are consumed and turned into
//! styles. A single newline inside a paragraph stays a line break, since
//! models lean on it for layout.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::TuiTheme;

const BULLET: &str = "• ";
const QUOTE_BAR: &str = "│ ";
const CODE_INDENT: &str = "  ";
const TAB_STOP: &str = "    ";

pub(crate) fn markdown_lines(text: &str, width: usize, theme: TuiTheme) -> Vec<Line<'static>> {
    let mut writer = MarkdownWriter::new(width, theme);
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        writer.event(event);
    }
    writer.finish()
}

struct ListState {
    number: Option<u64>,
    marker_width: usize,
}

struct MarkdownWriter {
    width: usize,
    theme: TuiTheme,
    lines: Vec<Line<'static>>,
    pending: Vec<Span<'static>>,
    styles: Vec<Style>,
    links: Vec<String>,
    lists: Vec<ListState>,
    item_marker: Option<String>,
    quote_depth: usize,
    code: Option<String>,
    needs_gap: bool,
}

impl MarkdownWriter {
    fn new(width: usize, theme: TuiTheme) -> Self {
        Self {
            width,
            theme,
            lines: Vec::new(),
            pending: Vec::new(),
            styles: Vec::new(),
            links: Vec::new(),
            lists: Vec::new(),
            item_marker: None,
            quote_depth: 0,
            code: None,
            needs_gap: false,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match self.code.as_mut() {
                Some(code) => code.push_str(&text),
                None => self.push_text(&text),
            },
            Event::Code(code) => {
                let style = self.theme.code_style();
                self.pending.push(Span::styled(code.into_string(), style));
            }
            Event::Html(html) => self.push_text(&html),
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.open_block();
                let rule = "─".repeat(self.width.max(3));
                self.lines
                    .push(Line::from(Span::styled(rule, self.theme.muted_style())));
                self.needs_gap = true;
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.open_block(),
            Tag::Heading { .. } => {
                self.open_block();
                self.styles.push(self.theme.header_style());
            }
            Tag::BlockQuote => {
                self.open_block();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.open_block();
                self.code = Some(String::new());
            }
            Tag::List(number) => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.open_block();
                }
                self.lists.push(ListState {
                    number,
                    marker_width: 0,
                });
            }
            Tag::Item => {
                self.flush_line();
                if let Some(list) = self.lists.last_mut() {
                    let marker = match list.number.as_mut() {
                        Some(number) => {
                            let marker = format!("{number}. ");
                            *number += 1;
                            marker
                        }
                        None => BULLET.to_string(),
                    };
                    list.marker_width = UnicodeWidthStr::width(marker.as_str());
                    self.item_marker = Some(marker);
                }
            }
            Tag::Emphasis => self.push_style(Modifier::ITALIC),
            Tag::Strong => self.push_style(Modifier::BOLD),
            Tag::Strikethrough => self.push_style(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.into_string());
                self.push_style(Modifier::UNDERLINED);
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => self.close_block(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.close_block();
            }
            TagEnd::BlockQuote => {
                self.close_block();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.push_code(&code);
                }
                self.needs_gap = true;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.needs_gap = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.styles.pop();
                let Some(dest) = self.links.pop() else {
                    return;
                };
                // Autolinks already show their target.
                let shown = self
                    .pending
                    .last()
                    .is_some_and(|span| span.content.as_ref() == dest);
                if !dest.is_empty() && !shown {
                    self.pending
                        .push(Span::styled(format!(" ({dest})"), self.theme.muted_style()));
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if let Some(code) = self.code.take() {
            self.push_code(&code);
        }
        self.flush_line();
        self.lines
    }

    fn inline_style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.inline_style().add_modifier(modifier);
        self.styles.push(style);
    }

    fn push_text(&mut self, text: &str) {
        let style = self.inline_style();
        for (index, part) in text.split('\n').enumerate() {
            if index > 0 {
                self.flush_line();
            }
            if !part.is_empty() {
                self.pending.push(Span::styled(part.to_string(), style));
            }
        }
    }

    fn push_code(&mut self, code: &str) {
        let style = self.theme.code_style();
        let code = code.strip_suffix('\n').unwrap_or(code);
        for line in code.split('\n') {
            let line = line.replace('\t', TAB_STOP);
            self.pending
                .push(Span::styled(format!("{CODE_INDENT}{line}"), style));
            self.flush_line();
        }
    }

    fn open_block(&mut self) {
        self.flush_line();
        if self.needs_gap && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_gap = false;
    }

    fn close_block(&mut self) {
        self.flush_line();
        self.needs_gap = true;
    }

    fn flush_line(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.pending);
        let (first, rest) = self.prefixes();
        let available = self
            .width
            .saturating_sub(UnicodeWidthStr::width(rest.as_str()))
            .max(1);
        let muted = self.theme.muted_style();
        for (index, row) in wrap_spans(spans, available).into_iter().enumerate() {
            let prefix = if index == 0 { &first } else { &rest };
            let mut line = Vec::with_capacity(row.len() + 1);
            if !prefix.is_empty() {
                line.push(Span::styled(prefix.clone(), muted));
            }
            line.extend(row);
            self.lines.push(Line::from(line));
        }
    }

    /// First-row and continuation prefixes for the block being flushed.
    fn prefixes(&mut self) -> (String, String) {
        let mut base = QUOTE_BAR.repeat(self.quote_depth);
        let Some((innermost, outer)) = self.lists.split_last() else {
            return (base.clone(), base);
        };
        let outer_width: usize = outer.iter().map(|list| list.marker_width).sum();
        base.push_str(&" ".repeat(outer_width));
        let continuation = format!("{base}{}", " ".repeat(innermost.marker_width));
        let first = match self.item_marker.take() {
            Some(marker) => format!("{base}{marker}"),
            None => continuation.clone(),
        };
        (first, continuation)
    }
}

fn wrap_spans(spans: Vec<Span<'static>>, max_width: usize) -> Vec<Vec<Span<'static>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut row_width = 0usize;

    for span in spans {
        let style = span.style;
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if row_width > 0 && row_width + ch_width > max_width {
                if !chunk.is_empty() {
                    row.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            chunk.push(ch);
            row_width += ch_width;
        }
        if !chunk.is_empty() {
            row.push(Span::styled(chunk, style));
        }
    }
    rows.push(row);
    rows
}
