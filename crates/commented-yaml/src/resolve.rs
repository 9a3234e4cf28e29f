//! YAML 1.2 core-schema resolution of scalar text.

use crate::value::Scalar;

/// Which null spellings are honoured while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nulls {
    Resolve,
    /// Key position: null-shaped text stays text.
    Keep,
}

/// Resolve an untagged plain scalar.
pub(crate) fn resolve_plain(text: &str, nulls: Nulls) -> Scalar {
    if is_null(text) {
        return match nulls {
            Nulls::Resolve => Scalar::Null,
            Nulls::Keep if text.is_empty() => Scalar::String("null".to_string()),
            Nulls::Keep => Scalar::String(text.to_string()),
        };
    }
    if let Some(b) = parse_bool(text) {
        return Scalar::Bool(b);
    }
    if let Some(n) = parse_int(text) {
        return Scalar::Int(n);
    }
    if looks_like_int(text) {
        // Out of i64 range.
        return Scalar::String(text.to_string());
    }
    if let Some(f) = parse_float(text) {
        return Scalar::Float(f);
    }
    Scalar::String(text.to_string())
}

/// Resolve a scalar carrying an explicit tag such as `!!int`.
pub(crate) fn resolve_tagged(text: &str, tag: &str) -> Scalar {
    let plain = || resolve_plain(text, Nulls::Resolve);
    let fallback = || Scalar::String(text.to_string());
    match tag {
        "!!null" => Scalar::Null,
        "!!bool" => parse_bool(text).map_or_else(fallback, Scalar::Bool),
        "!!int" => parse_int(text).map_or_else(fallback, Scalar::Int),
        "!!float" => match plain() {
            Scalar::Int(n) => {
                #[allow(clippy::cast_precision_loss)]
                let f = n as f64;
                Scalar::Float(f)
            }
            Scalar::Float(f) => Scalar::Float(f),
            _ => fallback(),
        },
        _ => fallback(),
    }
}

pub(crate) fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn looks_like_int(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_int(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x") {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(oct) = text.strip_prefix("0o") {
        if oct.is_empty() || !oct.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        return i64::from_str_radix(oct, 8).ok();
    }
    if looks_like_int(text) {
        return text.parse().ok();
    }
    None
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    if !is_decimal_float(text) {
        return None;
    }
    text.parse().ok()
}

/// `[-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?`
fn is_decimal_float(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = match fraction {
        None => !whole.is_empty() && all_digits(whole),
        Some(fraction) if whole.is_empty() => !fraction.is_empty() && all_digits(fraction),
        Some(fraction) => all_digits(whole) && all_digits(fraction),
    };
    let exponent_ok = exponent.is_none_or(|e| {
        let digits = e.strip_prefix(['-', '+']).unwrap_or(e);
        !digits.is_empty() && all_digits(digits)
    });
    mantissa_ok && exponent_ok
}

/// Text that resolves back to the same float.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    let text = f.to_string();
    if text.contains(['.', 'e', 'E']) {
        text
    } else {
        format!("{text}.0")
    }
}
