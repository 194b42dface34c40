//! Attribute engines: `id`, `data-testid`, `data-test-id`, `data-test`
//! and their `:light` twins

use inpage_dom::{Dom, NodeId};

use crate::engine::{scope_elements, unquote, QueryEngine, SelectorRoot};
use crate::errors::EngineResult;

/// Matches elements whose `attribute` equals the (unquoted) body
#[derive(Debug, Clone)]
pub struct AttributeEngine {
    attribute: String,
    pierce_shadow: bool,
}

impl AttributeEngine {
    pub fn new(attribute: impl Into<String>, pierce_shadow: bool) -> Self {
        Self {
            attribute: attribute.into(),
            pierce_shadow,
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl QueryEngine for AttributeEngine {
    fn query_all(&self, dom: &Dom, root: SelectorRoot, body: &str) -> EngineResult<Vec<NodeId>> {
        let value = unquote(body);
        Ok(scope_elements(dom, root, self.pierce_shadow)
            .into_iter()
            .filter(|id| dom.attribute(*id, &self.attribute) == Some(value))
            .collect())
    }
}
