//! Tool invocation contract, wire codec, and the built-in tool
//! registry (including bundled mock tools for the literal session
//! scenarios).

pub mod catalog;
pub mod error;
pub mod mocks;
pub mod registry;
pub mod tool;
pub mod wire;

pub use catalog::ToolCatalog;
pub use error::{Error, Result};
pub use registry::{build_tools, builtin_type_names};
pub use tool::{ActionSpec, Tool, ToolResult};
