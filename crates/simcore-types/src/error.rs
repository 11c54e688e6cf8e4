use std::fmt;

/// Result type for simcore-types operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by every crate that builds on the data model.
///
/// This mirrors the kinds named in the error-handling design: parse and
/// bind failures happen before a session exists, the rest happen during
/// or around a run.
#[derive(Debug)]
pub enum Error {
    /// Module text malformed or missing a required key. Raised to the
    /// caller of the loader; never surfaced as a session event.
    Parse(String),
    /// A tool `type` referenced by the module could not be resolved
    /// against the built-in registry or a discovered tool-spec catalog.
    UnknownToolType(String),
    /// `provide_input` while the session is not `awaiting_user`.
    BadState(String),
    /// A session id was not found in the manager's map.
    NotFound(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::UnknownToolType(t) => write!(f, "unknown tool type: {t}"),
            Error::BadState(msg) => write!(f, "bad state: {msg}"),
            Error::NotFound(id) => write!(f, "not found: {id}"),
        }
    }
}

impl std::error::Error for Error {}
