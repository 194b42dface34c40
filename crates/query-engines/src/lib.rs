//! Query engines for structured selectors
//!
//! A selector part names an engine and hands it a body; the engine finds
//! elements under a root. This crate defines the [`QueryEngine`] contract,
//! the built-in engines (`css`, `xpath`, `text` and the attribute engines,
//! each with a `:light` variant that stays out of shadow trees) and the
//! immutable [`EngineRegistry`] that maps names to engines.

mod attribute;
mod css;
pub mod engine;
pub mod errors;
pub mod registry;
mod text;
mod xpath;

pub use attribute::AttributeEngine;
pub use css::CssEngine;
pub use engine::*;
pub use errors::*;
pub use registry::*;
pub use text::TextEngine;
pub use xpath::XPathEngine;
