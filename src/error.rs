use std::path::PathBuf;

/// Everything that can go wrong while capturing or scraping a build log.
///
/// Line numbers carried by the variants are 1-based, as an editor shows them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An I/O failure on a specific file or directory.
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// No task name line was found for the marker at `line`.
    #[error("line {line}: no task name found for compiler arguments")]
    MissingTaskName { line: usize },

    #[error("line {line}: project line does not name a target: {text}")]
    MalformedProjectLine { line: usize, text: String },

    #[error("line {line}: marker line carries no arguments")]
    MissingArguments { line: usize },

    /// The line is narrower than the log gutter it is assumed to carry.
    #[error("line {line}: expected a {width} column log gutter, got {len}")]
    ShortLine {
        line: usize,
        width: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
