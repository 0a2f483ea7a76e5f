use thiserror::Error;

use crate::model_loader::ParseError;

/// Errors returned by the tokenizer's public operations
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Operation invalid in the current state, or an argument out of range.
    /// Calling before `load` and decoding an id past the vocabulary both land here.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    #[error("failed to read vocabulary: {0}")]
    IoFailure(#[source] std::io::Error),

    #[error("corrupt vocabulary: {0}")]
    Corrupt(String),
}

/// Error category, for callers that only branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotSupported,
    IoFailure,
    Corrupt,
}

impl TokenizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TokenizerError::NotSupported(_) => ErrorKind::NotSupported,
            TokenizerError::IoFailure(_) => ErrorKind::IoFailure,
            TokenizerError::Corrupt(_) => ErrorKind::Corrupt,
        }
    }

    pub(crate) fn not_supported(msg: impl Into<String>) -> Self {
        TokenizerError::NotSupported(msg.into())
    }
}

impl From<ParseError> for TokenizerError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io(e) => TokenizerError::IoFailure(e),
            ParseError::Corrupt(msg) => TokenizerError::Corrupt(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_map_to_load_kinds() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(TokenizerError::from(ParseError::Io(io)).kind(), ErrorKind::IoFailure);
        assert_eq!(
            TokenizerError::from(ParseError::Corrupt("bad".into())).kind(),
            ErrorKind::Corrupt
        );
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = TokenizerError::not_supported("token 9 is out of range");
        assert_eq!(err.to_string(), "operation not supported: token 9 is out of range");
    }
}
