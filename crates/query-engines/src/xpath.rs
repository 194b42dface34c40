//! `xpath` and `xpath:light` engines
//!
//! A location-path subset: `/` and `//` steps with a name test (`tag` or
//! `*`) and predicates `[@attr]`, `[@attr="v"]`, `[text()="v"]` and `[N]`.
//! Paths are always evaluated relative to the query root. XPath never
//! crosses into shadow trees, so both engine names behave the same.

use std::collections::HashSet;

use inpage_dom::{Dom, NodeId};

use crate::engine::{QueryEngine, SelectorRoot};
use crate::errors::{EngineError, EngineResult};

const ENGINE: &str = "xpath";

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    HasAttr(String),
    AttrEq(String, String),
    TextEq(String),
    /// 1-based position among the step's candidates
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// `//` (descendant-or-self, then child) versus `/` (child)
    descendant: bool,
    name: NameTest,
    predicates: Vec<Predicate>,
}

fn invalid(body: &str, reason: &str) -> EngineError {
    EngineError::invalid(ENGINE, body, reason)
}

fn parse(body: &str) -> EngineResult<Vec<Step>> {
    let mut rest = body.trim();
    if let Some(stripped) = rest.strip_prefix('.') {
        rest = stripped;
    }
    if rest.is_empty() {
        return Err(invalid(body, "empty location path"));
    }

    let mut steps = Vec::new();
    while !rest.is_empty() {
        let descendant = if let Some(stripped) = rest.strip_prefix("//") {
            rest = stripped;
            true
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
            false
        } else if steps.is_empty() {
            false
        } else {
            return Err(invalid(body, "expected '/' between steps"));
        };

        let name = if let Some(stripped) = rest.strip_prefix('*') {
            rest = stripped;
            NameTest::Any
        } else {
            let (name, stripped) = take_name(rest);
            if name.is_empty() {
                return Err(invalid(body, "expected a name test"));
            }
            rest = stripped;
            NameTest::Tag(name.to_ascii_lowercase())
        };

        let mut predicates = Vec::new();
        while let Some(inner) = rest.strip_prefix('[') {
            let close = predicate_end(inner).ok_or_else(|| invalid(body, "unterminated predicate"))?;
            predicates.push(parse_predicate(&inner[..close]).ok_or_else(|| {
                invalid(body, "unsupported predicate")
            })?);
            rest = &inner[close + 1..];
        }

        steps.push(Step {
            descendant,
            name,
            predicates,
        });
    }
    Ok(steps)
}

fn take_name(src: &str) -> (&str, &str) {
    let end = src
        .char_indices()
        .find(|(_, ch)| !(ch.is_alphanumeric() || matches!(ch, '-' | '_' | ':')))
        .map(|(index, _)| index)
        .unwrap_or(src.len());
    src.split_at(end)
}

fn predicate_end(src: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, ch) in src.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ']') => return Some(index),
            _ => {}
        }
    }
    None
}

fn parse_literal(src: &str) -> Option<String> {
    let src = src.trim();
    let quote = src.chars().next().filter(|ch| matches!(ch, '"' | '\''))?;
    let inner = src.strip_prefix(quote)?.strip_suffix(quote)?;
    (!inner.contains(quote)).then(|| inner.to_string())
}

fn parse_predicate(src: &str) -> Option<Predicate> {
    let src = src.trim();
    if !src.is_empty() && src.chars().all(|ch| ch.is_ascii_digit()) {
        let position = src.parse::<usize>().ok().filter(|n| *n > 0)?;
        return Some(Predicate::Position(position));
    }
    if let Some(attr) = src.strip_prefix('@') {
        let (name, rest) = take_name(attr);
        if name.is_empty() {
            return None;
        }
        let rest = rest.trim();
        if rest.is_empty() {
            return Some(Predicate::HasAttr(name.to_ascii_lowercase()));
        }
        let literal = parse_literal(rest.strip_prefix('=')?)?;
        return Some(Predicate::AttrEq(name.to_ascii_lowercase(), literal));
    }
    let rest = src.strip_prefix("text()")?.trim_start().strip_prefix('=')?;
    Some(Predicate::TextEq(parse_literal(rest)?))
}

fn apply(dom: &Dom, predicate: &Predicate, candidates: Vec<NodeId>) -> Vec<NodeId> {
    match predicate {
        Predicate::Position(position) => candidates.get(position - 1).copied().into_iter().collect(),
        Predicate::HasAttr(name) => candidates
            .into_iter()
            .filter(|id| dom.has_attribute(*id, name))
            .collect(),
        Predicate::AttrEq(name, value) => candidates
            .into_iter()
            .filter(|id| dom.attribute(*id, name) == Some(value.as_str()))
            .collect(),
        Predicate::TextEq(value) => candidates
            .into_iter()
            .filter(|id| {
                dom.children(*id)
                    .iter()
                    .any(|child| dom.text(*child) == Some(value.as_str()))
            })
            .collect(),
    }
}

fn evaluate(dom: &Dom, root: NodeId, steps: &[Step]) -> Vec<NodeId> {
    let mut context = vec![root];
    for step in steps {
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for node in &context {
            let parents = if step.descendant {
                let mut parents = vec![*node];
                parents.extend(dom.descendant_elements(*node, false));
                parents
            } else {
                vec![*node]
            };
            for parent in parents {
                let candidates = dom
                    .children(parent)
                    .iter()
                    .copied()
                    .filter(|child| match (&step.name, dom.element(*child)) {
                        (_, None) => false,
                        (NameTest::Any, Some(_)) => true,
                        (NameTest::Tag(tag), Some(element)) => element.is(tag),
                    })
                    .collect::<Vec<_>>();
                let matched = step
                    .predicates
                    .iter()
                    .fold(candidates, |acc, predicate| apply(dom, predicate, acc));
                next.extend(matched.into_iter().filter(|id| seen.insert(*id)));
            }
        }
        context = next;
    }

    let matched: HashSet<NodeId> = context.into_iter().collect();
    dom.descendant_elements(root, false)
        .into_iter()
        .filter(|id| matched.contains(id))
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XPathEngine;

impl QueryEngine for XPathEngine {
    fn query_all(&self, dom: &Dom, root: SelectorRoot, body: &str) -> EngineResult<Vec<NodeId>> {
        let steps = parse(body)?;
        Ok(evaluate(dom, root.node(), &steps))
    }
}
