use std::borrow::Cow;

/// Undo git's C-style path quoting.
///
/// With `core.quotePath` (the default) git wraps any path holding non-ASCII
/// bytes, control characters, `"` or `\` in double quotes and escapes those
/// bytes, so `é.md` arrives as `"\303\251.md"`. Unquoted paths pass through.
pub(crate) fn unquote_path(raw: &str) -> Cow<'_, str> {
    let inner = match raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.as_bytes(),
        None => return Cow::Borrowed(raw),
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        if inner[i] != b'\\' || i + 1 == inner.len() {
            bytes.push(inner[i]);
            i += 1;
            continue;
        }

        let escaped = inner[i + 1];
        let simple = match escaped {
            b'a' => Some(0x07),
            b'b' => Some(0x08),
            b't' => Some(b'\t'),
            b'n' => Some(b'\n'),
            b'v' => Some(0x0b),
            b'f' => Some(0x0c),
            b'r' => Some(b'\r'),
            b'"' | b'\\' => Some(escaped),
            _ => None,
        };
        if let Some(byte) = simple {
            bytes.push(byte);
            i += 2;
            continue;
        }

        match octal_byte(&inner[i + 1..]) {
            Some(byte) => {
                bytes.push(byte);
                i += 4;
            }
            None => {
                bytes.push(b'\\');
                i += 1;
            }
        }
    }

    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}

/// Three octal digits, as git writes every escaped high byte
fn octal_byte(digits: &[u8]) -> Option<u8> {
    let digits = digits.get(..3)?;
    let mut value: u16 = 0;
    for &d in digits {
        if !(b'0'..=b'7').contains(&d) {
            return None;
        }
        value = value * 8 + u16::from(d - b'0');
    }
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_borrowed() {
        assert!(matches!(unquote_path("src/lib.rs"), Cow::Borrowed("src/lib.rs")));
    }

    #[test]
    fn test_octal_utf8() {
        assert_eq!(unquote_path(r#""\303\251.md""#), "é.md");
        assert_eq!(unquote_path(r#""docs/\346\227\245\346\234\254.txt""#), "docs/日本.txt");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unquote_path(r#""tab\there""#), "tab\there");
        assert_eq!(unquote_path(r#""say \"hi\"""#), "say \"hi\"");
        assert_eq!(unquote_path(r#""back\\slash""#), "back\\slash");
    }

    #[test]
    fn test_unbalanced_quote_kept() {
        assert_eq!(unquote_path(r#""half"#), "\"half");
        assert_eq!(unquote_path("\""), "\"");
    }

    #[test]
    fn test_bad_escape_kept_literally() {
        assert_eq!(unquote_path(r#""a\qb""#), "a\\qb");
        assert_eq!(unquote_path(r#""a\9""#), "a\\9");
    }
}
