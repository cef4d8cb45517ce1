//! Markdown panel
//!
//! The document is read once at startup (from `MARKDOWN_PATH` / the config
//! `markdown.path`, or a built-in welcome note) and rendered on every frame
//! with pulldown-cmark into styled, word-wrapped lines.

use super::{error_line, style, Payload, RefreshState, Widget};
use crate::config::MarkdownConfig;
use crate::error::WidgetError;
use crate::tui::{Command, DashEvent, WidgetId};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use std::path::PathBuf;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

pub const DEFAULT_MARKDOWN: &str = "# Welcome to tuidash\n\n\
Use `MARKDOWN_PATH` to point at a local file. This panel renders Markdown \
so you can keep notes, dashboards, and runbooks nearby.\n";

/// Narrowest wrap width used for rendering
pub const MIN_WRAP_WIDTH: u16 = 20;

pub struct MarkdownWidget {
    id: WidgetId,
    path: Option<PathBuf>,
    state: RefreshState<String>,
}

impl MarkdownWidget {
    pub fn new(id: WidgetId, cfg: &MarkdownConfig) -> Self {
        Self {
            id,
            path: cfg.path.clone(),
            state: RefreshState::default(),
        }
    }
}

impl Widget for MarkdownWidget {
    fn title(&self) -> &str {
        "Markdown"
    }

    fn init(&self) -> Option<Command> {
        let path = self.path.clone();
        Some(Command::blocking(self.id, move || {
            let content = match path {
                Some(path) => std::fs::read_to_string(&path).map_err(|e| {
                    WidgetError::Io(format!("failed to read {}: {}", path.display(), e))
                })?,
                None => DEFAULT_MARKDOWN.to_string(),
            };
            Ok(Payload::Text(content))
        }))
    }

    fn update(&mut self, event: &DashEvent) -> Option<Command> {
        match event.fetched_for(self.id)? {
            Ok(Payload::Text(content)) => self.state.succeed(content.clone(), chrono::Local::now()),
            Ok(other) => self.state.fail(WidgetError::Parse(format!(
                "unexpected payload: {:?}",
                other
            ))),
            Err(e) => {
                warn!("Markdown load failed: {}", e);
                self.state.fail(e.clone());
            }
        }
        // Loaded once
        None
    }

    fn render(&self, width: u16, _height: u16) -> Text<'static> {
        if let Some(err) = self.state.error() {
            return Text::from(error_line(err));
        }
        match self.state.value() {
            Some(content) if !content.trim().is_empty() => {
                render_markdown(content.trim(), width.max(MIN_WRAP_WIDTH))
            }
            _ => Text::from(Line::styled("Waiting for markdown data...", style::muted())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleContext {
    Heading(HeadingLevel),
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Quote,
}

impl StyleContext {
    fn style(self) -> Style {
        match self {
            StyleContext::Heading(HeadingLevel::H1) => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            StyleContext::Heading(HeadingLevel::H2) => {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            }
            StyleContext::Heading(_) => Style::default().add_modifier(Modifier::BOLD),
            StyleContext::Emphasis => Style::default().add_modifier(Modifier::ITALIC),
            StyleContext::Strong => Style::default().add_modifier(Modifier::BOLD),
            StyleContext::Strikethrough => Style::default().add_modifier(Modifier::CROSSED_OUT),
            StyleContext::Link => Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            StyleContext::Quote => Style::default().fg(Color::Gray),
        }
    }
}

/// Ordered lists carry their next number
#[derive(Debug)]
struct ListState {
    next: Option<u64>,
}

struct RenderState {
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    /// Hanging indent for wrapped continuation lines of the current block
    indent: usize,
    style_stack: Vec<StyleContext>,
    list_stack: Vec<ListState>,
    quote_depth: usize,
    in_code_block: bool,
    needs_blank: bool,
}

impl RenderState {
    fn new(width: u16) -> Self {
        Self {
            width: usize::from(width),
            lines: Vec::new(),
            spans: Vec::new(),
            indent: 0,
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            needs_blank: false,
        }
    }

    fn process<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(&text),
                Event::Code(code) => self.push(
                    code.to_string(),
                    self.current_style().fg(Color::Yellow),
                ),
                Event::SoftBreak => self.push(" ".to_string(), Style::default()),
                Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_blank();
                    self.lines
                        .push(Line::styled("─".repeat(self.width), style::muted()));
                    self.needs_blank = true;
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.push(marker.to_string(), Style::default());
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    self.push(html.trim_end().to_string(), style::muted())
                }
                _ => {}
            }
        }
        self.flush_line();
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_blank();
                self.style_stack.push(StyleContext::Heading(level));
            }
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.flush_blank();
                }
            }
            Tag::Emphasis => self.style_stack.push(StyleContext::Emphasis),
            Tag::Strong => self.style_stack.push(StyleContext::Strong),
            Tag::Strikethrough => self.style_stack.push(StyleContext::Strikethrough),
            Tag::Link { .. } => self.style_stack.push(StyleContext::Link),
            Tag::BlockQuote(_) => {
                self.flush_blank();
                self.quote_depth += 1;
                self.style_stack.push(StyleContext::Quote);
            }
            Tag::CodeBlock(_) => {
                self.flush_blank();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.flush_blank();
                } else {
                    self.flush_line();
                }
                self.list_stack.push(ListState { next: start });
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_stack.len().saturating_sub(1);
                let bullet = match self.list_stack.last_mut() {
                    Some(ListState { next: Some(n) }) => {
                        let b = format!("{n}. ");
                        *n += 1;
                        b
                    }
                    _ => "• ".to_string(),
                };
                let lead = format!("{}{}", "  ".repeat(depth), bullet);
                self.indent = lead.width();
                self.spans.push(Span::raw(lead));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.style_stack.pop();
                self.flush_line();
                self.needs_blank = true;
            }
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.style_stack.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.style_stack.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.needs_blank = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.needs_blank = true;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Item => self.flush_line(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            // Code keeps its layout; long lines are cut by the panel
            let code = Style::default().fg(Color::Green);
            for line in text.lines() {
                let mut spans = self.quote_prefix();
                spans.push(Span::styled(format!("  {line}"), code));
                self.lines.push(Line::from(spans));
            }
            return;
        }
        self.push(text.to_string(), self.current_style());
    }

    fn push(&mut self, content: String, style: Style) {
        self.spans.push(Span::styled(content, style));
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .iter()
            .fold(Style::default(), |acc, ctx| acc.patch(ctx.style()))
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        if self.quote_depth == 0 {
            return Vec::new();
        }
        vec![Span::styled("│ ".repeat(self.quote_depth), style::muted())]
    }

    fn flush_line(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);
        let prefix = self.quote_prefix();
        let prefix_width: usize = prefix.iter().map(|s| s.width()).sum();
        let width = self.width.saturating_sub(prefix_width).max(1);

        for wrapped in wrap_spans(spans, width, self.indent) {
            let mut line = prefix.clone();
            line.extend(wrapped);
            self.lines.push(Line::from(line));
        }
        self.indent = 0;
    }

    fn flush_blank(&mut self) {
        self.flush_line();
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_blank = false;
    }

    fn finish(mut self) -> Text<'static> {
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        Text::from(self.lines)
    }
}

/// Greedy word wrap over styled spans
///
/// Whitespace separates words; styles are kept per fragment. Continuation
/// lines start with `indent` spaces. A word wider than `width` gets a line of
/// its own and is left for the panel to cut.
pub fn wrap_spans(spans: Vec<Span<'static>>, width: usize, indent: usize) -> Vec<Vec<Span<'static>>> {
    let leading: String = spans
        .first()
        .map(|s| s.content.chars().take_while(|c| *c == ' ').collect())
        .unwrap_or_default();

    let mut words: Vec<Vec<Span<'static>>> = Vec::new();
    let mut word: Vec<Span<'static>> = Vec::new();
    for span in spans {
        let style = span.style;
        let mut chunk = String::new();
        for ch in span.content.chars() {
            if ch.is_whitespace() {
                if !chunk.is_empty() {
                    word.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            } else {
                chunk.push(ch);
            }
        }
        if !chunk.is_empty() {
            word.push(Span::styled(chunk, style));
        }
    }
    if !word.is_empty() {
        words.push(word);
    }

    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = leading.width();
    let mut line_start = true;
    if !leading.is_empty() {
        current.push(Span::raw(leading));
    }

    for word in words {
        let word_width: usize = word.iter().map(|s| s.width()).sum();
        if !line_start && used + 1 + word_width > width {
            lines.push(std::mem::take(&mut current));
            current.push(Span::raw(" ".repeat(indent)));
            used = indent;
            line_start = true;
        }
        if !line_start {
            current.push(Span::raw(" "));
            used += 1;
        }
        used += word_width;
        current.extend(word);
        line_start = false;
    }
    if current.iter().any(|s| !s.content.trim().is_empty()) {
        lines.push(current);
    }
    lines
}

/// Render a markdown document to styled lines wrapped at `width`
pub fn render_markdown(markdown: &str, width: u16) -> Text<'static> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut state = RenderState::new(width);
    state.process(Parser::new_ext(markdown, options));
    state.finish()
}
