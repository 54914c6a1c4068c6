use std::{io, process::ExitStatus};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// List mode prints a single column; the payload is how many were asked for.
    #[error("Only one field can be selected (got {0})")]
    ListFieldCount(usize),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("failed to run `{program}`: {source}")]
    Command {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    CommandStatus {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid PAGER command: {0}")]
    PagerCommand(#[from] shell_words::ParseError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
