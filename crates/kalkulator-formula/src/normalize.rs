//! Formula text normalization
//!
//! Turns user-authored formula text into text the parser accepts. The passes
//! run in a fixed order:
//!
//! 1. the reserved delimiter `:` becomes [`DELIMITER_MARKER`];
//! 2. HTML entities are decoded (formulas are stored HTML-escaped);
//! 3. grammar rewriting: braces are dropped, a decimal comma becomes a
//!    point, `constant(` becomes `(`, `;` becomes the argument comma, and any
//!    colon produced by decoding gets the marker too.

use lazy_regex::regex;
use regex::Captures;

/// Reserved delimiter allowed in field names
pub const DELIMITER: char = ':';

/// Replacement for [`DELIMITER`]; a valid identifier fragment
pub const DELIMITER_MARKER: &str = "__p__";

/// Normalize formula text for the parser
///
/// # Example
/// ```rust
/// use kalkulator_formula::normalize;
///
/// assert_eq!(normalize("{width} * 2,5"), "width * 2.5");
/// assert_eq!(normalize("max({a:b}; 1)"), "max(a__p__b, 1)");
/// assert_eq!(normalize("{a} &gt; 1"), "a > 1");
/// ```
pub fn normalize(text: &str) -> String {
    let escaped = escape_delimiter(text);
    let decoded = decode_html_entities(&escaped);
    let rewritten = rewrite_syntax(&decoded);
    tracing::trace!(input = text, output = %rewritten, "normalized formula text");
    rewritten
}

/// Replace the reserved delimiter with its marker
///
/// Applied to formula text and to variable names alike, so that `{field:name}`
/// and a binding named `field:name` meet as `field__p__name`.
pub fn escape_delimiter(text: &str) -> String {
    text.replace(DELIMITER, DELIMITER_MARKER)
}

/// Turn a marker-escaped name back into its user-facing form
pub fn unescape_delimiter(text: &str) -> String {
    text.replace(DELIMITER_MARKER, &DELIMITER.to_string())
}

/// Decode named and numeric HTML entities
///
/// Unknown entities are left as they are.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    regex!(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);")
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            decode_entity(entity).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(code) = entity.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value);
    }

    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Rewrite decoded text into the evaluation grammar
fn rewrite_syntax(text: &str) -> String {
    // Order matters: ',' must become '.' before ';' turns into ','.
    text.replace(['{', '}'], "")
        .replace(',', ".")
        .replace("constant(", "(")
        .replace(';', ",")
        .replace(DELIMITER, DELIMITER_MARKER)
}
