//! Host document model for the in-page automation core
//!
//! The core never talks to a rendering engine directly. Hosts mirror the
//! page into a [`Dom`]: an arena of document, element, text, comment and
//! open shadow-root nodes, plus the rendering facts the probes read
//! (bounding rects, computed visibility, border widths) and the
//! form-control state the actions mutate. Synthetic events are recorded in
//! dispatch order so hosts can replay them.

mod dom;
pub mod errors;
pub mod events;
mod form;
pub mod geometry;
pub mod node;

pub use dom::*;
pub use errors::*;
pub use events::*;
pub use form::{parse_datetime_local, sanitize_input_value};
pub use geometry::*;
pub use node::*;
