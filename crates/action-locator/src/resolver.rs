//! Structured selector resolution

use std::collections::HashSet;
use std::sync::Arc;

use inpage_dom::{Dom, NodeId};
use query_engines::{EngineRegistry, QueryEngine, SelectorRoot};
use tracing::debug;

use crate::errors::SelectorError;
use crate::types::{ParsedSelector, SelectorPart};

/// Selector resolver trait
pub trait SelectorResolver: Send + Sync {
    /// First element the selector resolves to under `root`
    fn query_selector(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Option<NodeId>, SelectorError>;

    /// Every element the selector resolves to under `root`
    fn query_selector_all(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError>;
}

/// Resolver backed by an [`EngineRegistry`]
#[derive(Debug, Clone)]
pub struct DefaultSelectorResolver {
    registry: Arc<EngineRegistry>,
}

impl DefaultSelectorResolver {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    fn engine(&self, part: &SelectorPart) -> Result<&Arc<dyn QueryEngine>, SelectorError> {
        self.registry
            .get(&part.name)
            .ok_or_else(|| SelectorError::UnknownEngine(part.name.clone()))
    }

    fn check_engines(&self, parts: &[SelectorPart]) -> Result<(), SelectorError> {
        parts.iter().try_for_each(|part| self.engine(part).map(|_| ()))
    }

    fn query_root(dom: &Dom, root: NodeId) -> Result<SelectorRoot, SelectorError> {
        SelectorRoot::from_node(dom, root).ok_or_else(|| {
            SelectorError::InvalidArgument(format!(
                "Node is not queryable: {root} ({})",
                dom.node_name(root)
            ))
        })
    }

    /// Depth-first evaluation of `parts[index..]`: candidates of every
    /// intermediate part are tried left to right and the first one whose
    /// remaining chain matches wins.
    fn query_recursively(
        &self,
        dom: &Dom,
        parts: &[SelectorPart],
        capture: Option<usize>,
        index: usize,
        root: SelectorRoot,
    ) -> Result<Option<NodeId>, SelectorError> {
        let part = &parts[index];
        let engine = self.engine(part)?;
        if index == parts.len() - 1 {
            return Ok(engine.query(dom, root, &part.body)?);
        }

        for candidate in engine.query_all(dom, root, &part.body)? {
            let Some(next_root) = SelectorRoot::from_node(dom, candidate) else {
                continue;
            };
            if let Some(found) = self.query_recursively(dom, parts, capture, index + 1, next_root)? {
                return Ok(Some(if capture == Some(index) {
                    candidate
                } else {
                    found
                }));
            }
        }
        Ok(None)
    }
}

impl SelectorResolver for DefaultSelectorResolver {
    fn query_selector(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Option<NodeId>, SelectorError> {
        let query_root = Self::query_root(dom, root)?;
        self.check_engines(selector.parts())?;
        debug!(selector = %selector, root = %root, "Resolving selector");
        self.query_recursively(dom, selector.parts(), selector.capture(), 0, query_root)
    }

    fn query_selector_all(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let query_root = Self::query_root(dom, root)?;
        self.check_engines(selector.parts())?;
        debug!(selector = %selector, root = %root, "Resolving selector (all)");

        let (to_query_all, to_check_one) = selector.parts().split_at(selector.capture_index() + 1);

        let mut working_set = vec![query_root];
        let mut candidates = Vec::new();
        for (step, part) in to_query_all.iter().enumerate() {
            let engine = self.engine(part)?;
            let mut seen = HashSet::new();
            candidates.clear();
            for root in &working_set {
                for found in engine.query_all(dom, *root, &part.body)? {
                    if seen.insert(found) {
                        candidates.push(found);
                    }
                }
            }
            if step + 1 < to_query_all.len() {
                working_set = candidates
                    .iter()
                    .filter_map(|id| SelectorRoot::from_node(dom, *id))
                    .collect();
            }
        }

        if to_check_one.is_empty() {
            return Ok(candidates);
        }
        let mut verified = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(root) = SelectorRoot::from_node(dom, candidate) else {
                continue;
            };
            if self
                .query_recursively(dom, to_check_one, None, 0, root)?
                .is_some()
            {
                verified.push(candidate);
            }
        }
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectorPart;

    fn resolver() -> DefaultSelectorResolver {
        DefaultSelectorResolver::new(Arc::new(EngineRegistry::builtin()))
    }

    fn selector(parts: &[(&str, &str)], capture: Option<usize>) -> ParsedSelector {
        let parts = parts
            .iter()
            .map(|(name, body)| SelectorPart::new(*name, *body))
            .collect();
        ParsedSelector::new(parts, capture).unwrap()
    }

    #[test]
    fn text_and_comment_roots_are_rejected() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let text = dom.append_text(doc, "hello").unwrap();
        let err = resolver()
            .query_selector(&dom, &ParsedSelector::single("css", "div"), text)
            .unwrap_err();
        assert!(matches!(err, SelectorError::InvalidArgument(_)));
        let err = resolver()
            .query_selector_all(&dom, &ParsedSelector::single("css", "div"), NodeId(99))
            .unwrap_err();
        assert!(matches!(err, SelectorError::InvalidArgument(_)));
    }

    #[test]
    fn unknown_engine_is_reported_before_evaluation() {
        let dom = Dom::new();
        let sel = selector(&[("css", "nothing-here"), ("role", "button")], None);
        assert_eq!(
            resolver().query_selector(&dom, &sel, dom.document()),
            Err(SelectorError::UnknownEngine("role".into()))
        );
    }

    #[test]
    fn first_candidate_with_a_full_match_wins() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let empty = dom.append_element(doc, "section", &[]).unwrap();
        dom.append_element(empty, "i", &[]).unwrap();
        let full = dom.append_element(doc, "section", &[]).unwrap();
        let target = dom.append_element(full, "b", &[]).unwrap();

        let sel = selector(&[("css", "section"), ("css", "b")], None);
        assert_eq!(resolver().query_selector(&dom, &sel, doc), Ok(Some(target)));

        let sel = selector(&[("css", "section"), ("css", "b")], Some(0));
        assert_eq!(resolver().query_selector(&dom, &sel, doc), Ok(Some(full)));

        let sel = selector(&[("css", "section"), ("css", "u")], None);
        assert_eq!(resolver().query_selector(&dom, &sel, doc), Ok(None));
    }

    #[test]
    fn malformed_body_propagates_engine_error() {
        let dom = Dom::new();
        let err = resolver()
            .query_selector_all(&dom, &ParsedSelector::single("css", "div >"), dom.document())
            .unwrap_err();
        assert!(matches!(err, SelectorError::Engine(_)));
    }
}
