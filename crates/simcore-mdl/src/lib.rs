//! Module Definition Language: loads YAML module documents, validates
//! their structure, and binds variables/templates into a ready-to-run
//! `Module`.

pub mod binder;
pub mod error;
pub mod parser;
pub mod template;

pub use binder::bind;
pub use error::{Error, Result};
pub use parser::{parse_module, validate, ValidationIssue};
