//! Tagged-span extraction for model completions.
//!
//! Text models wrap parts of their replies in XML-like tags: reasoning
//! models emit `<think>…</think>` blocks that must never reach end users,
//! and the fortune prompt asks for the answer inside `<fortune>` tags.
//! `extract` splits a completion into the ordered contents of a
//! caller-supplied set of tags plus the untagged remainder.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

/// Result of a tag scan: one entry per requested tag (possibly empty) plus
/// whatever text was left once every matched span was cut out.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TagExtraction {
    /// Trimmed tag contents keyed by tag name, in order of appearance.
    /// Flattened so the serialized shape is `{ "<tag>": [...], "leftOver": [...] }`.
    #[serde(flatten)]
    pub tags: HashMap<String, Vec<String>>,
    /// Trimmed untagged remainder. Empty when the tags consumed the whole
    /// input; never holds more than one element.
    #[serde(rename = "leftOver")]
    pub leftover: Vec<String>,
}

impl TagExtraction {
    /// Contents captured for `tag`; empty if the tag never matched
    /// (or was never requested).
    pub fn tag(&self, tag: &str) -> &[String] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First captured span for `tag`, if any.
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.tag(tag).first().map(String::as_str)
    }

    /// The untagged remainder, or `""` when nothing was left.
    pub fn leftover_text(&self) -> &str {
        self.leftover.first().map(String::as_str).unwrap_or("")
    }
}

/// Split `input` into the contents of `tags` plus the untagged leftover.
///
/// Tags are processed one at a time, in caller order. For each tag, every
/// non-overlapping `<tag>…</tag>` span is captured (shortest match, across
/// newlines) and cut out of the working buffer before the next tag is
/// scanned — a later tag can never match text already claimed by an earlier
/// one. Tags do not nest; an opening tag with no matching close is plain
/// text and stays in the leftover.
///
/// Tag names are escaped before being interpolated into the match pattern,
/// so names containing regex metacharacters match literally.
pub fn extract(input: &str, tags: &[&str]) -> TagExtraction {
    let mut result = TagExtraction::default();
    for tag in tags {
        result.tags.entry((*tag).to_string()).or_default();
    }

    if input.is_empty() {
        return result;
    }
    if tags.is_empty() {
        let trimmed = input.trim();
        if !trimmed.is_empty() {
            result.leftover.push(trimmed.to_string());
        }
        return result;
    }

    let mut remaining = input.to_string();
    for tag in tags {
        let pattern = tag_pattern(tag);
        let mut captured: Vec<String> = Vec::new();
        let mut fragments: Vec<&str> = Vec::new();
        let mut last_end = 0usize;

        for caps in pattern.captures_iter(&remaining) {
            let span = caps.get(0).expect("capture 0 is the whole match");
            let inner = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            if span.start() > last_end {
                fragments.push(&remaining[last_end..span.start()]);
            }
            captured.push(inner.trim().to_string());
            last_end = span.end();
        }
        if last_end < remaining.len() {
            fragments.push(&remaining[last_end..]);
        }

        let next = fragments.concat();
        result
            .tags
            .entry((*tag).to_string())
            .or_default()
            .extend(captured);
        remaining = next;
    }

    let trimmed = remaining.trim();
    if !trimmed.is_empty() {
        result.leftover.push(trimmed.to_string());
    }
    result
}

/// Strip `<think>…</think>` reasoning blocks, returning only the visible
/// remainder. Input that is nothing but think blocks yields `""`.
pub fn filter_out_think(input: &str) -> String {
    extract(input, &["think"]).leftover_text().to_string()
}

fn tag_pattern(tag: &str) -> Regex {
    let name = regex::escape(tag);
    Regex::new(&format!("(?s)<{name}>(.*?)</{name}>"))
        .expect("escaped tag name always forms a valid pattern")
}
