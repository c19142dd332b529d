//! # wexpr-core
//!
//! Pure-Rust expression model and codecs for **Wexpr**, a human-writable,
//! machine-readable structured data format — a cousin of S-expressions with
//! an optional compact binary encoding.
//!
//! A Wexpr document is a single expression: `nil`, a value, Base64 binary
//! data, an array `#(...)` or a map `@(...)`. The textual codec also strips
//! comments and expands `[name]`/`*[name]` references while parsing; the
//! binary codec round-trips the same tree through length-prefixed,
//! type-tagged chunks.
//!
//! ## Quick start
//!
//! ```rust
//! use wexpr_core::{Expression, ParseFlags, WriteFlags};
//!
//! let expr = Expression::from_text("@(name wexpr tags #(s-expr data))", ParseFlags::None)?;
//! assert_eq!(
//!     expr.map_value_for_key("name").and_then(|v| v.value()),
//!     Some("wexpr"),
//! );
//!
//! // Round-trip through both codecs
//! assert_eq!(
//!     expr.to_text(0, WriteFlags::Compact),
//!     "@(name wexpr tags #(s-expr data))",
//! );
//! let back = Expression::from_binary_chunk(&expr.to_binary_chunk())?;
//! assert_eq!(back, expr);
//! # Ok::<(), wexpr_core::WexprError>(())
//! ```
//!
//! ## Modules
//!
//! - [`expression`] — the `Expression` tree and its operations
//! - [`decoder`] — textual Wexpr → `Expression`
//! - [`encoder`] — `Expression` → textual Wexpr (compact or pretty)
//! - [`binary`] — the chunked binary encoding and the file header
//! - [`error`] — the `{code, line, column, message}` error record

pub mod binary;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod expression;

pub use binary::{file_header, ChunkType, FILE_HEADER_SIZE, FILE_MAGIC, FILE_VERSION};
pub use decoder::ParseFlags;
pub use encoder::WriteFlags;
pub use error::{ErrorCode, Result, WexprError};
pub use expression::{Expression, ExpressionType};
