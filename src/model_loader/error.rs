use thiserror::Error;

/// Failure while reading a vocabulary file
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file could not be opened, read or written
    #[error("failed to access vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes do not describe a valid vocabulary
    #[error("corrupt vocabulary file: {0}")]
    Corrupt(String),
}

impl ParseError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        ParseError::Corrupt(msg.into())
    }
}
