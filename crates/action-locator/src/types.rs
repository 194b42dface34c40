//! Core types for selector resolution

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SelectorError;

/// One `engine=body` step of a selector
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectorPart {
    /// Engine name, e.g. `css` or `text:light`
    pub name: String,
    pub body: String,
}

impl SelectorPart {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// A selector as handed over by the driver, already split into parts.
///
/// Parts chain left to right: every part is evaluated inside the elements
/// matched by the part before it. `capture` picks which part's match is
/// returned; `None` means the last part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSelector")]
pub struct ParsedSelector {
    parts: Vec<SelectorPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capture: Option<usize>,
}

#[derive(Deserialize)]
struct RawSelector {
    parts: Vec<SelectorPart>,
    #[serde(default)]
    capture: Option<usize>,
}

impl TryFrom<RawSelector> for ParsedSelector {
    type Error = SelectorError;

    fn try_from(raw: RawSelector) -> Result<Self, Self::Error> {
        ParsedSelector::new(raw.parts, raw.capture)
    }
}

impl ParsedSelector {
    pub fn new(parts: Vec<SelectorPart>, capture: Option<usize>) -> Result<Self, SelectorError> {
        if parts.is_empty() {
            return Err(SelectorError::EmptySelector);
        }
        if let Some(capture) = capture {
            if capture >= parts.len() {
                return Err(SelectorError::InvalidCapture {
                    capture,
                    len: parts.len(),
                });
            }
        }
        Ok(Self { parts, capture })
    }

    /// Single-part selector without an explicit capture
    pub fn single(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::new(name, body)],
            capture: None,
        }
    }

    pub fn parts(&self) -> &[SelectorPart] {
        &self.parts
    }

    pub fn capture(&self) -> Option<usize> {
        self.capture
    }

    /// Index of the part whose match is returned
    pub fn capture_index(&self) -> usize {
        self.capture.unwrap_or(self.parts.len() - 1)
    }
}

impl fmt::Display for ParsedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, part) in self.parts.iter().enumerate() {
            if index > 0 {
                f.write_str(" >> ")?;
            }
            if self.capture == Some(index) {
                f.write_str("*")?;
            }
            write!(f, "{}={}", part.name, part.body)?;
        }
        Ok(())
    }
}
