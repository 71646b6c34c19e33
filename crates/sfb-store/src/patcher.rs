//! Template patcher
//!
//! The firmware header is opaque to us except for one line:
//!
//! ```text
//! Direction_t direction_sequence[] = { ... };
//! ```
//!
//! Patching swaps that declaration for a freshly compiled literal and leaves
//! every other byte alone. The body is bounded by the first `}` after the
//! opening brace, so a declaration whose initializer contains braces will not
//! match. That is a known limit of single-pattern text surgery over a real
//! parse of the header.

use crate::error::PatchError;
use once_cell::sync::Lazy;
use regex::Regex;
use sfb_program::{SEQUENCE_IDENT, SEQUENCE_TYPE_NAME};
use std::ops::Range;

/// Header used when the target file is missing or empty
pub const DEFAULT_TEMPLATE: &str = "#include <cstdint>

typedef enum {
    FORWARD,
    RIGHT,
    LEFT,
    BACK,
    NORMAL,
    FLIP,
} Direction_t;

Direction_t direction_sequence[] = {};

uint8_t MAX_STATES_NUM = sizeof(direction_sequence) / sizeof(direction_sequence[0]);
";

static DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&declaration_pattern()).expect("sequence declaration pattern compiles")
});

fn declaration_pattern() -> String {
    format!(
        r"{}\s+{}\[\]\s*=\s*\{{[^}}]*\}};",
        regex::escape(SEQUENCE_TYPE_NAME),
        regex::escape(SEQUENCE_IDENT)
    )
}

/// Byte range of the first sequence declaration in `content`
#[must_use]
pub fn find_declaration(content: &str) -> Option<Range<usize>> {
    DECLARATION.find(content).map(|m| m.range())
}

/// `literal` is one declaration with nothing before or after it
fn is_whole_declaration(literal: &str) -> bool {
    find_declaration(literal).is_some_and(|range| range == (0..literal.len()))
}

/// Replace the sequence declaration in `existing` with `literal`
///
/// An absent or empty `existing` is replaced by [`DEFAULT_TEMPLATE`] first.
/// If several declarations match, only the first is replaced.
///
/// # Errors
/// - `PatchError::InvalidLiteral` if `literal` is not exactly one declaration
/// - `PatchError::Mismatch` if the template holds no declaration
pub fn patch(existing: Option<&str>, literal: &str) -> Result<String, PatchError> {
    if !is_whole_declaration(literal) {
        return Err(PatchError::InvalidLiteral(literal.to_string()));
    }

    let template = match existing {
        Some(content) if !content.is_empty() => content,
        _ => {
            tracing::debug!("using built-in default template");
            DEFAULT_TEMPLATE
        }
    };

    let range = find_declaration(template).ok_or_else(|| PatchError::Mismatch {
        pattern: DECLARATION.as_str().to_string(),
    })?;

    let matches = DECLARATION.find_iter(template).count();
    if matches > 1 {
        tracing::warn!(matches, "template holds several sequence declarations; patching the first");
    }

    let mut patched = String::with_capacity(template.len() - range.len() + literal.len());
    patched.push_str(&template[..range.start]);
    patched.push_str(literal);
    patched.push_str(&template[range.end..]);
    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NEW: &str = "Direction_t direction_sequence[] = {FORWARD, FLIP};";

    #[test]
    fn default_template_has_one_declaration() {
        assert_eq!(DECLARATION.find_iter(DEFAULT_TEMPLATE).count(), 1);
    }

    #[test]
    fn absent_and_empty_use_default() {
        let from_none = patch(None, NEW).unwrap();
        let from_empty = patch(Some(""), NEW).unwrap();

        assert_eq!(from_none, from_empty);
        assert!(from_none.contains(NEW));
        assert!(from_none.contains("uint8_t MAX_STATES_NUM"));
    }

    #[test]
    fn tolerates_whitespace_and_multiline_body() {
        let template = "// head\nDirection_t   direction_sequence[]={\n  RIGHT,\n  LEFT\n} ;x\n";
        // `} ;` has a space before the semicolon, so it does not match
        assert!(patch(Some(template), NEW).is_err());

        let template = "// head\nDirection_t   direction_sequence[]={\n  RIGHT,\n  LEFT\n};x\n";
        assert_eq!(patch(Some(template), NEW).unwrap(), format!("// head\n{NEW}x\n"));
    }

    #[test]
    fn literal_must_be_a_declaration() {
        let err = patch(Some(DEFAULT_TEMPLATE), "$0").unwrap_err();
        assert!(matches!(err, PatchError::InvalidLiteral(_)));
    }

    #[test]
    fn literal_with_surrounding_text_is_rejected() {
        for literal in [
            format!("int evil = 1;\n{NEW}"),
            format!("{NEW}\nint evil = 1;"),
            format!(" {NEW}"),
        ] {
            let err = patch(Some(DEFAULT_TEMPLATE), &literal).unwrap_err();
            assert!(matches!(err, PatchError::InvalidLiteral(_)), "{literal}");
        }
    }

    #[test]
    fn mismatch_reports_pattern() {
        let err = patch(Some("int main() {}\n"), NEW).unwrap_err();
        match err {
            PatchError::Mismatch { pattern } => assert!(pattern.contains("direction_sequence")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn only_first_of_several_is_replaced() {
        let decl = "Direction_t direction_sequence[] = {BACK};";
        let template = format!("{decl}\n{decl}\n");
        let patched = patch(Some(&template), NEW).unwrap();
        assert_eq!(patched, format!("{NEW}\n{decl}\n"));
    }
}
