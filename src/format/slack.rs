//! Slack mrkdwn rendering for slash-command replies

use super::{header_emoji, paragraphs, translate_bold};

/// Render a transcript as Slack mrkdwn, paragraphs separated by blank lines.
pub fn to_slack(transcript: &str) -> String {
    paragraphs(transcript)
        .map(render_paragraph)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_paragraph(paragraph: &str) -> String {
    let body = translate_bold(&escape_mrkdwn(paragraph), "*", "*");
    match header_emoji(paragraph) {
        Some(emoji) => format!("{emoji} {body}"),
        None => body,
    }
}

/// Slack treats `&`, `<` and `>` as control characters in message text.
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
