//! Reply classification and markup escaping.

use std::sync::LazyLock;

use regex::Regex;

/// Whole-text fenced block: opening fence with optional language tag, body,
/// newline, closing fence. Nothing may follow the closing fence.
const FENCED_BLOCK_PATTERN: &str = r"(?s)\A```([A-Za-z0-9_]+)?\n(.*)\n```\z";

static FENCED_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(FENCED_BLOCK_PATTERN)
        .inspect_err(|e| log::error!("Fenced block pattern rejected: {}", e))
        .ok()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    PlainText(String),
    CodeBlock {
        language: Option<String>,
        body: String,
    },
}

impl ParsedReply {
    /// Full markup for the reply, safe to insert into a markup surface.
    pub fn to_markup(&self) -> String {
        match self {
            Self::PlainText(text) => escape_markup(text),
            Self::CodeBlock { language, body } => format!(
                "<pre><code data-lang=\"{}\">{}</code></pre>",
                escape_markup(language.as_deref().unwrap_or("")),
                escape_markup(body)
            ),
        }
    }
}

pub fn classify(text: &str) -> ParsedReply {
    let Some(caps) = FENCED_BLOCK
        .as_ref()
        .and_then(|pattern| pattern.captures(text.trim()))
    else {
        return ParsedReply::PlainText(text.to_string());
    };
    ParsedReply::CodeBlock {
        language: caps.get(1).map(|m| m.as_str().to_string()),
        body: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
    }
}

pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
