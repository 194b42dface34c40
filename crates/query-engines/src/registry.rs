//! Name → engine table consulted by the selector resolver

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::attribute::AttributeEngine;
use crate::css::CssEngine;
use crate::engine::QueryEngine;
use crate::text::TextEngine;
use crate::xpath::XPathEngine;

/// Engines every registry starts from
pub const BUILTIN_ENGINE_NAMES: [&str; 14] = [
    "css",
    "css:light",
    "xpath",
    "xpath:light",
    "text",
    "text:light",
    "id",
    "id:light",
    "data-testid",
    "data-testid:light",
    "data-test-id",
    "data-test-id:light",
    "data-test",
    "data-test:light",
];

const ATTRIBUTE_ENGINES: [&str; 4] = ["id", "data-testid", "data-test-id", "data-test"];

/// Immutable engine table. Built once, then shared behind an `Arc`.
#[derive(Clone)]
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn QueryEngine>>,
}

impl EngineRegistry {
    pub fn builder() -> EngineRegistryBuilder {
        EngineRegistryBuilder::default()
    }

    /// The built-in table only
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    /// Built-ins followed by `custom`, in order. A custom engine whose name
    /// collides with an earlier entry replaces it.
    pub fn with_custom_engines<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = (S, Arc<dyn QueryEngine>)>,
        S: Into<String>,
    {
        custom
            .into_iter()
            .fold(Self::builder().with_builtins(), |builder, (name, engine)| {
                builder.register_arc(name, engine)
            })
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn QueryEngine>> {
        self.engines.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct EngineRegistryBuilder {
    engines: HashMap<String, Arc<dyn QueryEngine>>,
}

impl EngineRegistryBuilder {
    pub fn with_builtins(self) -> Self {
        let xpath: Arc<dyn QueryEngine> = Arc::new(XPathEngine);
        let mut builder = self
            .register("css", CssEngine::deep())
            .register("css:light", CssEngine::light())
            .register_arc("xpath", xpath.clone())
            .register_arc("xpath:light", xpath)
            .register("text", TextEngine::deep())
            .register("text:light", TextEngine::light());
        for attribute in ATTRIBUTE_ENGINES {
            builder = builder
                .register(attribute, AttributeEngine::new(attribute, true))
                .register(format!("{attribute}:light"), AttributeEngine::new(attribute, false));
        }
        builder
    }

    pub fn register(self, name: impl Into<String>, engine: impl QueryEngine + 'static) -> Self {
        self.register_arc(name, Arc::new(engine))
    }

    /// Last write wins
    pub fn register_arc(mut self, name: impl Into<String>, engine: Arc<dyn QueryEngine>) -> Self {
        let name = name.into();
        if self.engines.insert(name.clone(), engine).is_some() {
            debug!(engine = %name, "Replacing previously registered query engine");
        }
        self
    }

    pub fn build(self) -> EngineRegistry {
        EngineRegistry {
            engines: self.engines,
        }
    }
}
