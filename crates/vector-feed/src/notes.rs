// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Release notes rendering
//!
//! Release bodies are Markdown written on GitHub, where a single newline is a
//! line break. The rendered HTML is embedded by update clients, so it is kept
//! to text formatting: no images, no scripts or styles, no attributes on raw
//! HTML, and links only to web or mail targets.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use std::sync::LazyLock;

/// Raw HTML tags passed through (without attributes). `img` is never allowed.
const ALLOWED_RAW_TAGS: &[&str] = &[
    "b",
    "blockquote",
    "br",
    "code",
    "del",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "i",
    "li",
    "ol",
    "p",
    "pre",
    "s",
    "strong",
    "sub",
    "sup",
    "table",
    "tbody",
    "td",
    "th",
    "thead",
    "tr",
    "u",
    "ul",
];

const VOID_TAGS: &[&str] = &["br", "hr"];

/// Elements dropped together with their content
const CONTENT_STRIPPED_TAGS: &[&str] = &["script", "style"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

static RAW_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*?(/?)>")
        .expect("valid raw html regex")
});

#[derive(Debug, Default)]
struct RawHtmlState {
    /// Depth inside script/style elements
    stripped_depth: usize,
}

/// Render release notes Markdown to restricted HTML
pub fn render_notes(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut state = RawHtmlState::default();
    let mut skipping_link = false;
    let mut events = Vec::new();

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::Image { .. }) | Event::End(TagEnd::Image) => {}
            Event::Start(Tag::Link { ref dest_url, .. }) if !is_safe_url(dest_url) => {
                skipping_link = true;
            }
            Event::End(TagEnd::Link) if skipping_link => {
                skipping_link = false;
            }
            Event::Html(raw) => {
                let filtered = filter_raw_html(&raw, &mut state);
                if !filtered.is_empty() {
                    events.push(Event::Html(CowStr::from(filtered)));
                }
            }
            Event::InlineHtml(raw) => {
                let filtered = filter_raw_html(&raw, &mut state);
                if !filtered.is_empty() {
                    events.push(Event::InlineHtml(CowStr::from(filtered)));
                }
            }
            Event::Text(_) | Event::Code(_) if state.stripped_depth > 0 => {}
            Event::SoftBreak if state.stripped_depth > 0 => {}
            Event::SoftBreak => events.push(Event::HardBreak),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {}
            other => events.push(other),
        }
    }

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output.trim_end().to_string()
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    let scheme_end = url.find(':');
    let path_start = url.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => url
            .get(..colon)
            .is_some_and(|scheme| ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str())),
        (None, _) => true,
    }
}

/// Keep allowed tags stripped of attributes, drop the rest, escape stray brackets
fn filter_raw_html(raw: &str, state: &mut RawHtmlState) -> String {
    let mut out = String::new();
    let mut last = 0;

    for caps in RAW_TOKEN.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        if state.stripped_depth == 0 {
            push_escaped_text(&mut out, raw.get(last..whole.start()).unwrap_or_default());
        }
        last = whole.end();

        let Some(name) = caps.get(2) else {
            // comment
            continue;
        };
        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

        if CONTENT_STRIPPED_TAGS.contains(&name.as_str()) {
            if closing {
                state.stripped_depth = state.stripped_depth.saturating_sub(1);
            } else if !self_closing {
                state.stripped_depth += 1;
            }
            continue;
        }

        if state.stripped_depth > 0 || !ALLOWED_RAW_TAGS.contains(&name.as_str()) {
            continue;
        }

        if VOID_TAGS.contains(&name.as_str()) {
            if !closing {
                out.push_str(&format!("<{name}>"));
            }
        } else if closing {
            out.push_str(&format!("</{name}>"));
        } else {
            out.push_str(&format!("<{name}>"));
        }
    }

    if state.stripped_depth == 0 {
        push_escaped_text(&mut out, raw.get(last..).unwrap_or_default());
    }
    out
}

fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
