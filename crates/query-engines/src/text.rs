//! `text` and `text:light` engines
//!
//! Body forms:
//! - `"Sign in"`: whitespace-normalised exact match
//! - `/sign\s+in/i`: regular expression with JavaScript-style flags
//! - `sign in`: case-insensitive substring match
//!
//! An element matches on its own text, i.e. the text nodes that are its
//! direct children, so a match names the innermost element holding the text.

use inpage_dom::{normalize_whitespace, Dom, NodeId};
use regex::{Regex, RegexBuilder};

use crate::engine::{scope_elements, QueryEngine, SelectorRoot};
use crate::errors::{EngineError, EngineResult};

const SKIPPED_TAGS: [&str; 3] = ["head", "script", "style"];

#[derive(Debug, Clone)]
enum TextMatcher {
    Exact(String),
    Pattern(Regex),
    Contains(String),
}

impl TextMatcher {
    fn parse(engine: &str, body: &str) -> EngineResult<Self> {
        if body.len() >= 2 && body.starts_with('"') && body.ends_with('"') {
            return Ok(TextMatcher::Exact(normalize_whitespace(&body[1..body.len() - 1])));
        }
        if let Some(close) = body.rfind('/').filter(|close| body.starts_with('/') && *close > 0) {
            let flags = &body[close + 1..];
            if let Some(flag) = flags.chars().find(|flag| !"gimsuy".contains(*flag)) {
                return Err(EngineError::invalid(engine, body, format!("unknown flag '{flag}'")));
            }
            let pattern = RegexBuilder::new(&body[1..close])
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .build()
                .map_err(|err| EngineError::invalid(engine, body, err.to_string()))?;
            return Ok(TextMatcher::Pattern(pattern));
        }
        let needle = normalize_whitespace(body).to_lowercase();
        if needle.is_empty() {
            return Err(EngineError::invalid(engine, body, "empty text"));
        }
        Ok(TextMatcher::Contains(needle))
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            TextMatcher::Exact(expected) => text == expected,
            TextMatcher::Pattern(pattern) => pattern.is_match(text),
            TextMatcher::Contains(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextEngine {
    pierce_shadow: bool,
}

impl TextEngine {
    pub fn deep() -> Self {
        Self {
            pierce_shadow: true,
        }
    }

    pub fn light() -> Self {
        Self {
            pierce_shadow: false,
        }
    }

    fn name(&self) -> &'static str {
        if self.pierce_shadow {
            "text"
        } else {
            "text:light"
        }
    }
}

impl QueryEngine for TextEngine {
    fn query_all(&self, dom: &Dom, root: SelectorRoot, body: &str) -> EngineResult<Vec<NodeId>> {
        let matcher = TextMatcher::parse(self.name(), body)?;
        Ok(scope_elements(dom, root, self.pierce_shadow)
            .into_iter()
            .filter(|id| {
                let skipped = dom
                    .tag_name(*id)
                    .is_some_and(|tag| SKIPPED_TAGS.contains(&tag));
                let has_text = dom.children(*id).iter().any(|child| dom.is_text(*child));
                !skipped && has_text && matcher.matches(&normalize_whitespace(&dom.own_text(*id)))
            })
            .collect())
    }
}
