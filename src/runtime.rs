//! Page runtime assembly
//!
//! Wires the document, the engine registry, the resolver, the poller and the
//! action primitives together from a [`RuntimeConfig`].

use std::fmt;
use std::sync::Arc;

use action_locator::DefaultSelectorResolver;
use action_primitives::DefaultActionPrimitives;
use inpage_dom::SharedDom;
use inpage_scheduler::{FrameSource, Poller, TimerFrameSource};
use query_engines::{EngineRegistry, QueryEngine};
use tracing::info;

use crate::config::RuntimeConfig;

/// Everything the driver talks to for one page
pub struct PageRuntime {
    dom: SharedDom,
    registry: Arc<EngineRegistry>,
    primitives: Arc<DefaultActionPrimitives>,
    config: RuntimeConfig,
}

impl PageRuntime {
    /// Runtime with the default configuration and built-in engines only
    pub fn new(dom: SharedDom) -> Self {
        Self::builder(dom).build()
    }

    pub fn builder(dom: SharedDom) -> PageRuntimeBuilder {
        PageRuntimeBuilder {
            dom,
            config: RuntimeConfig::default(),
            custom_engines: Vec::new(),
            frames: None,
        }
    }

    pub fn dom(&self) -> &SharedDom {
        &self.dom
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// The driver-facing surface
    pub fn primitives(&self) -> &Arc<DefaultActionPrimitives> {
        &self.primitives
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl fmt::Debug for PageRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRuntime")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub struct PageRuntimeBuilder {
    dom: SharedDom,
    config: RuntimeConfig,
    custom_engines: Vec<(String, Arc<dyn QueryEngine>)>,
    frames: Option<Arc<dyn FrameSource>>,
}

impl PageRuntimeBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a custom engine after the built-ins; a colliding name
    /// replaces the earlier engine
    pub fn engine(mut self, name: impl Into<String>, engine: impl QueryEngine + 'static) -> Self {
        self.custom_engines.push((name.into(), Arc::new(engine)));
        self
    }

    /// Drive frame-paced polls from `frames` instead of the configured timer
    pub fn frame_source(mut self, frames: Arc<dyn FrameSource>) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn build(self) -> PageRuntime {
        let custom_count = self.custom_engines.len();
        let registry = Arc::new(EngineRegistry::with_custom_engines(self.custom_engines));
        let frames = self
            .frames
            .unwrap_or_else(|| Arc::new(TimerFrameSource::new(self.config.frame_interval())));
        let resolver = Arc::new(DefaultSelectorResolver::new(Arc::clone(&registry)));
        let primitives = DefaultActionPrimitives::new(self.dom.clone(), resolver, Poller::new(frames))
            .with_options(self.config.primitive_options());

        info!(
            engines = registry.len(),
            custom_engines = custom_count,
            frame_interval_ms = self.config.frame_interval_ms,
            "Page runtime ready"
        );
        PageRuntime {
            dom: self.dom,
            registry,
            primitives: Arc::new(primitives),
            config: self.config,
        }
    }
}
