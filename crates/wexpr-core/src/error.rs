//! Error types for Wexpr parsing and encoding operations.

use thiserror::Error;

/// Machine-readable failure codes for both codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Input bytes were not valid UTF-8.
    InvalidUtf8,
    /// A structural character appeared where an expression was expected.
    InvalidExpression,
    /// Non-whitespace input remained after the root expression.
    ExtraDataAfterExpression,
    /// A quoted value was never closed.
    StringMissingEndingQuote,
    /// An array `#(` was never closed.
    ArrayMissingEndParen,
    /// A map `@(` was never closed.
    MapMissingEndParen,
    /// A map key parsed to something other than a value.
    MapKeyMustBeAValue,
    /// A map held an odd number of items (a key with no value).
    MapMissingValue,
    /// A reference `[name]` or `*[name]` was never closed.
    ReferenceMissingEndBracket,
    /// A reference name held characters outside `[A-Za-z0-9_]`.
    ReferenceInvalidName,
    /// A reference declaration had no expression following it.
    ReferenceMissingExpression,
    /// A reference expansion named a reference that was never declared.
    ReferenceUnknownReference,
    /// A binary data block `<` was never closed.
    BinaryDataNoEnding,
    /// A binary data block held bytes outside the Base64 alphabet.
    BinaryDataInvalidBase64,
    /// A block comment `;(--` was never closed.
    BlockCommentMissingEnd,
    /// The file header magic or reserved bytes were wrong.
    BinaryInvalidHeader,
    /// The file header carried a version this library does not speak.
    BinaryUnknownVersion,
    /// A binary document held more than one main expression chunk.
    BinaryMultipleExpressions,
    /// A chunk's declared size ran past the end of the input.
    BinaryChunkTruncated,
    /// A binary map key chunk was not a value chunk.
    BinaryMapKeyMustBeAValue,
}

/// The error record every failing parse produces: a code, the position the
/// failure was detected at, and a human-readable message.
///
/// Lines and columns are 1-based and count bytes; a newline resets the
/// column. Binary decode failures have no meaningful position and report
/// `0:0`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct WexprError {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl WexprError {
    /// A textual codec error at the given position.
    pub(crate) fn parse(
        code: ErrorCode,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        WexprError {
            code,
            line,
            column,
            message: message.into(),
        }
    }

    /// A binary codec error (position fixed at 0:0).
    pub(crate) fn binary(code: ErrorCode, message: impl Into<String>) -> Self {
        WexprError {
            code,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout wexpr-core.
pub type Result<T> = std::result::Result<T, WexprError>;
