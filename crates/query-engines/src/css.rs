//! `css` and `css:light` engines
//!
//! Supports compound selectors built from a tag name or `*`, `#id`,
//! `.class` and attribute conditions (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`,
//! `[a*=v]`), joined by descendant or child combinators, in comma-separated
//! selector lists. The deep variant pierces open shadow roots both when
//! enumerating candidates and when walking ancestors for combinators.

use inpage_dom::{Dom, Element, NodeId};

use crate::engine::{scope_elements, QueryEngine, SelectorRoot};
use crate::errors::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
}

impl AttrCondition {
    fn matches(&self, element: &Element) -> bool {
        match self {
            AttrCondition::Exists { key } => element.has_attribute(key),
            AttrCondition::Eq { key, value } => element.attribute(key) == Some(value.as_str()),
            AttrCondition::StartsWith { key, value } => element
                .attribute(key)
                .is_some_and(|actual| !value.is_empty() && actual.starts_with(value.as_str())),
            AttrCondition::EndsWith { key, value } => element
                .attribute(key)
                .is_some_and(|actual| !value.is_empty() && actual.ends_with(value.as_str())),
            AttrCondition::Contains { key, value } => element
                .attribute(key)
                .is_some_and(|actual| !value.is_empty() && actual.contains(value.as_str())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !element.is(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| element.class_list().any(|token| token == class.as_str()))
        {
            return false;
        }
        self.attrs.iter().all(|attr| attr.matches(element))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChainPart {
    compound: Compound,
    /// Relation to the part on the left
    combinator: Option<Combinator>,
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorList {
    groups: Vec<Vec<ChainPart>>,
}

impl SelectorList {
    fn parse(engine: &str, body: &str) -> EngineResult<Self> {
        let groups = split_groups(body).ok_or_else(|| {
            EngineError::invalid(engine, body, "unbalanced brackets or empty group")
        })?;
        let groups = groups
            .into_iter()
            .map(|group| {
                parse_chain(group)
                    .ok_or_else(|| EngineError::invalid(engine, body, "unsupported syntax"))
            })
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self { groups })
    }

    fn matches(&self, dom: &Dom, id: NodeId, pierce_shadow: bool) -> bool {
        self.groups
            .iter()
            .any(|chain| matches_chain(dom, id, chain, pierce_shadow))
    }
}

fn matches_chain(dom: &Dom, id: NodeId, chain: &[ChainPart], pierce_shadow: bool) -> bool {
    let Some((last, rest)) = chain.split_last() else {
        return true;
    };
    if !dom.element(id).is_some_and(|element| last.compound.matches(element)) {
        return false;
    }
    let parent_of = |node: NodeId| {
        if pierce_shadow {
            dom.parent_element_or_shadow_host(node)
        } else {
            dom.parent_element(node)
        }
    };
    match last.combinator {
        None => true,
        Some(Combinator::Child) => {
            parent_of(id).is_some_and(|parent| matches_chain(dom, parent, rest, pierce_shadow))
        }
        Some(Combinator::Descendant) => {
            let mut current = parent_of(id);
            while let Some(ancestor) = current {
                if matches_chain(dom, ancestor, rest, pierce_shadow) {
                    return true;
                }
                current = parent_of(ancestor);
            }
            false
        }
    }
}

fn split_groups(selector: &str) -> Option<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (index, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, ',') if depth == 0 => {
                groups.push(selector[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    groups.push(selector[start..].trim());
    if groups.iter().any(|group| group.is_empty()) {
        return None;
    }
    Some(groups)
}

fn parse_chain(group: &str) -> Option<Vec<ChainPart>> {
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;
    for token in tokenize(group)? {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return None;
            }
            pending = Some(Combinator::Child);
            continue;
        }
        let compound = parse_compound(token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(ChainPart {
            compound,
            combinator,
        });
    }
    if parts.is_empty() || pending.is_some() {
        return None;
    }
    Some(parts)
}

fn tokenize(group: &str) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (index, ch) in group.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' if depth > 0 => quote = Some(ch),
            '[' => {
                depth += 1;
                start.get_or_insert(index);
            }
            ']' => depth = depth.checked_sub(1)?,
            '>' if depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&group[begin..index]);
                }
                tokens.push(">");
            }
            ch if ch.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&group[begin..index]);
                }
            }
            _ => {
                start.get_or_insert(index);
            }
        }
    }
    if let Some(begin) = start {
        tokens.push(&group[begin..]);
    }
    Some(tokens)
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = token;
    while let Some(first) = rest.chars().next() {
        match first {
            '*' => {
                if compound.universal || compound.tag.is_some() {
                    return None;
                }
                compound.universal = true;
                rest = &rest[1..];
            }
            '#' => {
                let (ident, tail) = take_ident(&rest[1..])?;
                if compound.id.replace(ident.to_string()).is_some() {
                    return None;
                }
                rest = tail;
            }
            '.' => {
                let (ident, tail) = take_ident(&rest[1..])?;
                compound.classes.push(ident.to_string());
                rest = tail;
            }
            '[' => {
                let (condition, tail) = parse_attr_condition(&rest[1..])?;
                compound.attrs.push(condition);
                rest = tail;
            }
            _ => {
                if !compound.is_empty() {
                    return None;
                }
                let (ident, tail) = take_ident(rest)?;
                compound.tag = Some(ident.to_ascii_lowercase());
                rest = tail;
            }
        }
    }
    (!compound.is_empty()).then_some(compound)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn take_ident(src: &str) -> Option<(&str, &str)> {
    let end = src
        .char_indices()
        .find(|(_, ch)| !is_ident_char(*ch))
        .map(|(index, _)| index)
        .unwrap_or(src.len());
    (end > 0).then(|| src.split_at(end))
}

/// Parse the inside of `[...]`; `src` starts right after the bracket
fn parse_attr_condition(src: &str) -> Option<(AttrCondition, &str)> {
    let src = src.trim_start();
    let (key, rest) = take_ident(src)?;
    let key = key.to_ascii_lowercase();
    let rest = rest.trim_start();
    if let Some(tail) = rest.strip_prefix(']') {
        return Some((AttrCondition::Exists { key }, tail));
    }

    let (operator, rest) = ["^=", "$=", "*=", "="]
        .iter()
        .find_map(|op| rest.strip_prefix(op).map(|tail| (*op, tail)))?;
    let rest = rest.trim_start();
    let (value, rest) = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let close = rest[1..].find(quote)? + 1;
            (&rest[1..close], &rest[close + 1..])
        }
        _ => take_ident(rest)?,
    };
    let tail = rest.trim_start().strip_prefix(']')?;
    let value = value.to_string();
    let condition = match operator {
        "^=" => AttrCondition::StartsWith { key, value },
        "$=" => AttrCondition::EndsWith { key, value },
        "*=" => AttrCondition::Contains { key, value },
        _ => AttrCondition::Eq { key, value },
    };
    Some((condition, tail))
}

/// CSS engine; `pierce_shadow` distinguishes `css` from `css:light`
#[derive(Debug, Clone, Copy)]
pub struct CssEngine {
    pierce_shadow: bool,
}

impl CssEngine {
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
            "css"
        } else {
            "css:light"
        }
    }
}

impl QueryEngine for CssEngine {
    fn query_all(&self, dom: &Dom, root: SelectorRoot, body: &str) -> EngineResult<Vec<NodeId>> {
        let selector = SelectorList::parse(self.name(), body)?;
        Ok(scope_elements(dom, root, self.pierce_shadow)
            .into_iter()
            .filter(|id| selector.matches(dom, *id, self.pierce_shadow))
            .collect())
    }
}
