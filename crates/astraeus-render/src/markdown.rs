//! Markdown conversion

use pulldown_cmark::{Event, Options, Parser, html};

use crate::sanitize;

/// Convert markdown-flavored text to safe display markup.
///
/// Total over arbitrary input, including every syntactically-incomplete
/// prefix of a streamed answer. Raw HTML in the input is escaped to text
/// rather than passed through, and script-bearing constructs are stripped
/// before parsing. If conversion escapes in any way, the result is the
/// input with `&`, `<`, `>`, `"`, and `'` escaped to entities.
pub fn render_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| render_unchecked(text))) {
        Ok(markup) => markup,
        Err(_) => {
            tracing::warn!("markdown conversion failed, falling back to escaped text");
            escape_text(text)
        }
    }
}

fn render_unchecked(text: &str) -> String {
    let clean = sanitize::neutralize(text);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    // Raw HTML becomes text so the writer escapes it on output.
    let parser = Parser::new_ext(&clean, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);

    // A rendered link must not be able to hijack the hosting context.
    if out.contains("<a href=") {
        out = out.replace(
            "<a href=",
            "<a target=\"_blank\" rel=\"noopener noreferrer\" href=",
        );
    }

    out
}

/// Escape `&`, `<`, `>`, `"`, and `'` to their entity equivalents in a
/// single left-to-right scan.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
