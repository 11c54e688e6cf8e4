use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// `environment.tools[].type` did not resolve against the built-in
    /// registry or a discovered tool-spec catalog.
    UnknownToolType(String),
    /// A catalog tool-spec document is missing required fields.
    MalformedToolSpec { path: String, reason: String },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownToolType(t) => write!(f, "unknown tool type: {t}"),
            Error::MalformedToolSpec { path, reason } => {
                write!(f, "malformed tool spec at {path}: {reason}")
            }
            Error::Io(e) => write!(f, "tool catalog io error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
