// AI reply formatting and a small markdown renderer for the terminal

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Marker that keeps a single line break visible after markdown rendering.
pub const LINE_BREAK_MARKER: &str = "&nbsp; \n";

/// Collapses every run of two or more newlines to one plain newline and
/// marks each lone newline with [`LINE_BREAK_MARKER`].
pub fn preserve_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\n' {
            out.push(ch);
            continue;
        }

        let mut run = 1;
        while chars.peek() == Some(&'\n') {
            chars.next();
            run += 1;
        }

        if run > 1 {
            out.push('\n');
        } else {
            out.push_str(LINE_BREAK_MARKER);
        }
    }

    out
}

fn decode_entities(line: &str) -> String {
    line.replace("&nbsp;", " ")
}

/// Renders an AI reply: line breaks are preserved, then each line is styled.
pub fn render_reply(text: &str) -> Vec<Line<'static>> {
    render_markdown_to_lines(&preserve_line_breaks(text))
}

/// Convert markdown text to styled lines, tracking fenced code blocks.
pub fn render_markdown_to_lines(markdown: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for raw in markdown.lines() {
        let line = decode_entities(raw);

        if is_code_fence(&line) {
            if in_code_block {
                lines.push(Line::from(Span::styled(
                    "└────────────────────────────────",
                    Style::default().fg(Color::DarkGray),
                )));
            } else {
                let lang = extract_code_language(&line);
                lines.push(Line::from(Span::styled(
                    format!("┌─ {} ─────────────────────────", lang.as_deref().unwrap_or("code")),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            in_code_block = !in_code_block;
        } else if in_code_block {
            lines.push(Line::from(Span::styled(
                format!("  {}", line.trim_end()),
                Style::default().fg(Color::Green),
            )));
        } else {
            lines.push(render_markdown_line(&line));
        }
    }

    lines
}

fn flush(spans: &mut Vec<Span<'static>>, text: &mut String) {
    if !text.is_empty() {
        spans.push(Span::raw(std::mem::take(text)));
    }
}

/// Render a single line of markdown with basic styling
fn render_markdown_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();

    let level = trimmed.chars().take_while(|&c| c == '#').count();
    let after = &trimmed[level..];
    if (1..=6).contains(&level) && (after.is_empty() || after.starts_with(' ')) {
        let title = after.trim();
        let color = match level {
            1 => Color::Yellow,
            2 => Color::Cyan,
            _ => Color::Blue,
        };
        return Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let mut spans = Vec::new();
    let body = match trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        Some(item) => {
            spans.push(Span::styled("• ", Style::default().fg(Color::Cyan)));
            item
        }
        None => line,
    };

    let mut text = String::new();
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut bold = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    if c == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        closed = true;
                        break;
                    }
                    bold.push(c);
                }

                if closed {
                    flush(&mut spans, &mut text);
                    spans.push(Span::styled(
                        bold,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    text.push_str("**");
                    text.push_str(&bold);
                }
            }
            '`' => {
                let mut code = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '`' {
                        closed = true;
                        break;
                    }
                    code.push(c);
                }

                if closed {
                    flush(&mut spans, &mut text);
                    spans.push(Span::styled(code, Style::default().fg(Color::Magenta)));
                } else {
                    text.push('`');
                    text.push_str(&code);
                }
            }
            _ => text.push(ch),
        }
    }
    flush(&mut spans, &mut text);

    Line::from(spans)
}

/// Detect if a line is a code block fence
pub fn is_code_fence(line: &str) -> bool {
    line.trim().starts_with("```")
}

/// Extract language from code fence
pub fn extract_code_language(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix("```")
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(ToString::to_string)
}
