//! Line-oriented mapping from model prose to display blocks
//!
//! The mapper understands the small markdown subset the model is asked to
//! produce. Anything it does not recognise becomes a plain paragraph, so every
//! input text maps to some block list.

use serde::Serialize;

/// Inline run inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Inline {
    Text(String),
    Bold(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Heading { level: u8, text: String },
    NumberedItem { number: String, content: Vec<Inline> },
    Bullet { content: Vec<Inline> },
    Rule,
    Spacer,
    Paragraph { content: Vec<Inline> },
}

/// Map response text to blocks, one block per line
pub fn format_response(text: &str) -> Vec<Block> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(classify_line)
        .collect()
}

fn classify_line(line: &str) -> Block {
    if let Some(rest) = line.strip_prefix("## ") {
        return Block::Heading { level: 2, text: rest.to_string() };
    }
    if let Some(rest) = line.strip_prefix("### ") {
        return Block::Heading { level: 3, text: rest.to_string() };
    }
    if let Some((number, rest)) = split_numbered(line) {
        return Block::NumberedItem {
            number: number.to_string(),
            content: parse_inline(rest),
        };
    }
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("• ")) {
        return Block::Bullet { content: parse_inline(rest) };
    }
    if line.starts_with("---") {
        return Block::Rule;
    }
    if line.trim().is_empty() {
        return Block::Spacer;
    }
    Block::Paragraph { content: parse_inline(line) }
}

/// `12. rest` -> ("12", "rest"); requires digits, a dot, then one whitespace char
fn split_numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let ws = rest.chars().next().filter(|c| c.is_whitespace())?;
    Some((&line[..digits], &rest[ws.len_utf8()..]))
}

/// Split `**bold**` spans out of a line; an unmatched `**` stays literal
pub fn parse_inline(line: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        // Bold text needs at least one character
        let Some(first) = after_open.chars().next() else { break };
        let Some(close) = after_open[first.len_utf8()..].find("**") else { break };
        let close = close + first.len_utf8();

        if open > 0 {
            spans.push(Inline::Text(rest[..open].to_string()));
        }
        spans.push(Inline::Bold(after_open[..close].to_string()));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Inline::Text(rest.to_string()));
    }
    spans
}

/// Render blocks to HTML; all text is escaped before it is wrapped in markup
pub fn to_html(blocks: &[Block]) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let tag = if *level == 2 { "h3" } else { "h4" };
                html.push_str(&format!("<{tag}>{}</{tag}>", escape_html(text)));
            }
            Block::NumberedItem { number, content } => {
                html.push_str(&format!(
                    "<div class=\"item\"><span class=\"item-number\">{}.</span><span>{}</span></div>",
                    escape_html(number),
                    inline_html(content)
                ));
            }
            Block::Bullet { content } => {
                html.push_str(&format!(
                    "<div class=\"bullet\"><span class=\"bullet-mark\">•</span><span>{}</span></div>",
                    inline_html(content)
                ));
            }
            Block::Rule => html.push_str("<hr>"),
            Block::Spacer => html.push_str("<div class=\"spacer\"></div>"),
            Block::Paragraph { content } => {
                html.push_str(&format!("<p>{}</p>", inline_html(content)));
            }
        }
        html.push('\n');
    }
    html
}

fn inline_html(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Text(text) => escape_html(text),
            Inline::Bold(text) => format!("<strong>{}</strong>", escape_html(text)),
        })
        .collect()
}

pub fn escape_html(text: &str) -> String {
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
