use core::fmt::Write;

use super::ScalarNode;
use crate::resolve::{self, Nulls};
use crate::value::Scalar;

pub(crate) fn present(scalar: &Scalar) -> ScalarNode {
    match scalar {
        Scalar::Null => plain("null"),
        Scalar::Bool(b) => plain(b.to_string()),
        Scalar::Int(n) => plain(n.to_string()),
        Scalar::Float(f) => plain(resolve::format_float(*f)),
        Scalar::String(s) => present_str(s),
    }
}

pub(crate) fn present_key(key: &str) -> ScalarNode {
    present_str(key)
}

fn plain(text: impl Into<String>) -> ScalarNode {
    ScalarNode {
        text: text.into(),
        quoted: false,
    }
}

fn present_str(s: &str) -> ScalarNode {
    ScalarNode {
        text: s.to_string(),
        quoted: !is_plain_safe(s),
    }
}

/// Whether `s` reads back as the same string when written unquoted.
fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if s.trim() != s || "-?:,[]{}#&*!|>'\"%@`".contains(first) || s.starts_with("...") {
        return false;
    }
    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }
    if s.chars().any(|c| c.is_control() || c == '\u{feff}') {
        return false;
    }
    resolve::resolve_plain(s, Nulls::Resolve).as_str() == Some(s)
}

pub(super) fn write_double_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() || c == '\u{feff}' => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
