use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while manipulating the document tree.
///
/// These never escape a formatting command: the editor session logs them and
/// falls back to refocusing the editable root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("position is outside the document")]
    InvalidPosition,
    #[error("block index {0} does not exist")]
    InvalidBlockIndex(usize),
    #[error("the document has no blocks")]
    EmptyDocument,
    #[error("saved selection no longer maps onto the document")]
    DetachedSelection,
}

/// Result of an editing operation
pub type EditResult<T = ()> = Result<T, EditError>;

/// Errors raised while loading or saving the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("toml serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors raised when a toolbar command cannot be interpreted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("invalid value {value:?} for command {command:?}")]
    InvalidValue { command: String, value: String },
}
