//! Project configuration discovery and parsing for Malloy connections
//!
//! `discovery` locates a `malloy-config.json` for a target file; `parser` turns its
//! text into a `ConfigDocument` and overlays it on the built-in defaults.

pub mod discovery;
pub mod parser;

pub use discovery::{ConfigDiscovery, FsConfigDiscovery};
pub use parser::{default_document, merge_with_defaults, parse};
