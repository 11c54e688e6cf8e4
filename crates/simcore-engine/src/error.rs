use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// An agent implementation raised. Recoverable: the executor
    /// records a human-readable `agent` message and continues rather
    /// than terminating the session.
    AgentFailure(String),
    /// A bound module reached `await_user` in the synchronous
    /// executor, which has no suspension mechanism. Fatal.
    ExecutorFatal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AgentFailure(msg) => write!(f, "agent failure: {msg}"),
            Error::ExecutorFatal(msg) => write!(f, "executor fatal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
