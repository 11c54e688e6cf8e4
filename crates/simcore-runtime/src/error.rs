use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds for the interactive executor, session manager, and
/// engine configuration.
#[derive(Debug)]
pub enum Error {
    /// A session operation referenced an id not present in the
    /// manager's map.
    NotFound(String),
    /// `provide_input` while the session isn't `awaiting_user`, or any
    /// other operation attempted against a session in the wrong state.
    BadState(String),
    /// Delegated from `simcore-engine`: an agent or step failure that
    /// doesn't terminate the session.
    Engine(simcore_engine::Error),
    /// A tool type the registry doesn't recognize.
    UnknownToolType(String),
    /// Configuration file or workspace path resolution failed.
    Config(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(id) => write!(f, "session not found: {id}"),
            Error::BadState(msg) => write!(f, "bad state: {msg}"),
            Error::Engine(e) => write!(f, "engine error: {e}"),
            Error::UnknownToolType(t) => write!(f, "unknown tool type: {t}"),
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Engine(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<simcore_engine::Error> for Error {
    fn from(e: simcore_engine::Error) -> Self {
        Error::Engine(e)
    }
}

impl From<simcore_tools::Error> for Error {
    fn from(e: simcore_tools::Error) -> Self {
        Error::UnknownToolType(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
