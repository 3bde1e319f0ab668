//! Transcript rendering for display surfaces
//!
//! Transcripts are markdown-ish text: paragraphs separated by blank lines,
//! each turn starting with a `**Name**:` header and bold spans written as
//! `**text**`. The renderers escape the target's special characters and
//! translate every bold span exactly once.

mod html;
mod slack;

pub use html::to_html;
pub use slack::{escape_mrkdwn, to_slack};

use crate::persona::Persona;
use regex::Regex;
use std::sync::OnceLock;

const PRODUCT_HEADER: &str = "Product";
const PRODUCT_EMOJI: &str = "📦";

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*([^\n]+?)\*\*").expect("valid bold pattern"))
}

fn header_pattern() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^\*\*([^*\n]+)\*\*:").expect("valid header pattern"))
}

/// Non-empty, trimmed paragraphs of a transcript.
fn paragraphs(transcript: &str) -> impl Iterator<Item = &str> {
    transcript
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Emoji for a paragraph that opens with a known speaker header.
fn header_emoji(paragraph: &str) -> Option<&'static str> {
    let name = header_pattern().captures(paragraph)?.get(1)?.as_str();
    if name == PRODUCT_HEADER {
        return Some(PRODUCT_EMOJI);
    }
    Persona::from_display_name(name).map(Persona::emoji)
}

/// Replace every `**text**` span with `open` text `close`.
fn translate_bold(text: &str, open: &str, close: &str) -> String {
    bold_pattern()
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{open}{}{close}", &caps[1])
        })
        .into_owned()
}
