//! HTML rendering used by `/chathtml`

use super::{header_emoji, paragraphs, translate_bold};

/// Render a transcript as a sequence of `<p>` elements.
pub fn to_html(transcript: &str) -> String {
    paragraphs(transcript)
        .map(render_paragraph)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_paragraph(paragraph: &str) -> String {
    let body = translate_bold(&escape(paragraph), "<strong>", "</strong>")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("<br>");

    match header_emoji(paragraph) {
        Some(emoji) => format!("<p>{emoji} {body}</p>"),
        None => format!("<p>{body}</p>"),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
