//! Textual Wexpr encoder — renders an [`Expression`] tree as Wexpr source.
//!
//! Two modes, selected by [`WriteFlags`]:
//!
//! - **Compact**: one line, children separated by single spaces —
//!   `@(key1 value1 key2 #(a b))`
//! - **HumanReadable**: arrays and maps open on their own line, each child
//!   is indented one tab deeper, and the closing paren returns to the
//!   container's depth.
//!
//! Values are written unquoted when the payload survives re-parsing as a
//! bare word; anything empty, containing whitespace or a structural
//! character, or colliding with the `nil`/`null` keywords is quoted, with
//! `\` and `"` escaped. Neither mode emits a trailing newline.
//!
//! Comments and references are parse-time constructs and are never written.

use crate::expression::Expression;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Output mode for [`Expression::to_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFlags {
    /// Minified single-line output.
    #[default]
    Compact,
    /// Indented multi-line output (tabs).
    HumanReadable,
}

impl Expression {
    /// Render this expression as Wexpr text.
    ///
    /// `indent` is the starting depth for HumanReadable mode (tabs before
    /// nested lines; the first line itself is not indented, so the output
    /// can continue an existing line). Compact mode ignores it.
    ///
    /// An `Invalid` expression renders as the empty string, and `Invalid`
    /// children of arrays and maps are omitted.
    pub fn to_text(&self, indent: usize, flags: WriteFlags) -> String {
        let mut out = String::new();
        match flags {
            WriteFlags::Compact => write_compact(self, &mut out),
            WriteFlags::HumanReadable => write_human_readable(self, indent, &mut out),
        }
        out
    }
}

fn write_compact(expr: &Expression, out: &mut String) {
    match expr {
        Expression::Invalid => {}
        Expression::Null => out.push_str("nil"),
        Expression::Value(value) => write_value_token(value, out),
        Expression::BinaryData(data) => write_binary_token(data, out),
        Expression::Array(children) => {
            out.push_str("#(");
            let mut first = true;
            for child in children.iter().filter(|c| !matches!(c, Expression::Invalid)) {
                if !first {
                    out.push(' ');
                }
                first = false;
                write_compact(child, out);
            }
            out.push(')');
        }
        Expression::Map(pairs) => {
            out.push_str("@(");
            let mut first = true;
            for (key, value) in pairs {
                if matches!(value, Expression::Invalid) {
                    continue;
                }
                if !first {
                    out.push(' ');
                }
                first = false;
                write_value_token(key, out);
                out.push(' ');
                write_compact(value, out);
            }
            out.push(')');
        }
    }
}

fn write_human_readable(expr: &Expression, indent: usize, out: &mut String) {
    match expr {
        Expression::Array(children) => {
            let children: Vec<&Expression> = children
                .iter()
                .filter(|c| !matches!(c, Expression::Invalid))
                .collect();
            if children.is_empty() {
                out.push_str("#()");
                return;
            }
            out.push_str("#(\n");
            for child in children {
                push_tabs(indent + 1, out);
                write_human_readable(child, indent + 1, out);
                out.push('\n');
            }
            push_tabs(indent, out);
            out.push(')');
        }
        Expression::Map(pairs) => {
            let pairs: Vec<&(String, Expression)> = pairs
                .iter()
                .filter(|(_, v)| !matches!(v, Expression::Invalid))
                .collect();
            if pairs.is_empty() {
                out.push_str("@()");
                return;
            }
            out.push_str("@(\n");
            for (key, value) in pairs {
                push_tabs(indent + 1, out);
                write_value_token(key, out);
                out.push(' ');
                write_human_readable(value, indent + 1, out);
                out.push('\n');
            }
            push_tabs(indent, out);
            out.push(')');
        }
        // Leaves render the same in both modes.
        other => write_compact(other, out),
    }
}

fn push_tabs(count: usize, out: &mut String) {
    for _ in 0..count {
        out.push('\t');
    }
}

/// Write a value payload (or map key), quoting only when the bare bytes
/// would not re-parse as the same value.
fn write_value_token(value: &str, out: &mut String) {
    if needs_quoting(value) {
        out.push('"');
        for ch in value.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                _ => out.push(ch),
            }
        }
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// A payload must be quoted if it is empty, holds whitespace or a
/// structural character, or would read back as the null keyword.
fn needs_quoting(value: &str) -> bool {
    if value.is_empty() || value == "nil" || value == "null" {
        return true;
    }
    value.bytes().any(|b| {
        matches!(
            b,
            b' ' | b'\t' | b'\r' | b'\n'
                | b'(' | b')' | b'[' | b']' | b'<' | b'>' | b'#' | b'@' | b'"' | b';'
        )
    })
}

fn write_binary_token(data: &[u8], out: &mut String) {
    out.push('<');
    out.push_str(&BASE64.encode(data));
    out.push('>');
}
