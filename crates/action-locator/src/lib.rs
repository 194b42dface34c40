//! Selector resolution
//!
//! Resolves driver-parsed, multi-part selectors against a document through
//! the query-engine registry:
//! - `query_selector`: depth-first, first full match wins, optional capture
//! - `query_selector_all`: breadth-first over a deduplicated working set,
//!   then each candidate is verified against the parts after the capture

pub mod errors;
pub mod resolver;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use types::*;
