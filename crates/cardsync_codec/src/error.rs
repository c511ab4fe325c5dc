//! Error types for the codec crate.

use thiserror::Error;

/// Result type for document decoding.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Errors that can occur while decoding a local deck document.
///
/// Every variant carries the 1-based card block and line so the offending
/// part of the file can be located.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document structure could not be decoded.
    #[error("malformed document at block {block}, line {line}: {message}")]
    MalformedDocument {
        /// 1-based index of the card block.
        block: usize,
        /// 1-based line where the offending segment starts.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A metadata header contained a key this format does not define.
    #[error("unknown metadata field `{key}` at block {block}, line {line}")]
    UnknownField {
        /// The unrecognised key.
        key: String,
        /// 1-based index of the card block.
        block: usize,
        /// 1-based line of the header entry.
        line: usize,
    },
}

impl DocumentError {
    /// Create a malformed document error.
    pub fn malformed(block: usize, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            block,
            line,
            message: message.into(),
        }
    }

    /// Create an unknown field error.
    pub fn unknown_field(key: impl Into<String>, block: usize, line: usize) -> Self {
        Self::UnknownField {
            key: key.into(),
            block,
            line,
        }
    }

    /// Returns the 1-based block index the error refers to.
    pub fn block(&self) -> usize {
        match self {
            Self::MalformedDocument { block, .. } | Self::UnknownField { block, .. } => *block,
        }
    }

    /// Returns the 1-based line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedDocument { line, .. } | Self::UnknownField { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_locates_block() {
        let err = DocumentError::malformed(3, 12, "empty answer");
        assert_eq!(
            err.to_string(),
            "malformed document at block 3, line 12: empty answer"
        );
        assert_eq!(err.block(), 3);
        assert_eq!(err.line(), 12);

        let err = DocumentError::unknown_field("deck", 1, 2);
        assert!(err.to_string().contains("`deck`"));
        assert_eq!(err.line(), 2);
    }
}
