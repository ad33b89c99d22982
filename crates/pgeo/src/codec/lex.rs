//! Token-level helpers for the text format.
//!
//! Attribute string tables and the varmap manifest are written as
//! double-quoted, backslash-escaped fields; everything else on a line
//! is plain whitespace-separated tokens.

/// Wraps `text` in double quotes, escaping `\` and `"`.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Splits a string into whitespace-separated fields, where a field may
/// be a double-quoted string containing backslash escapes.
///
/// Returns `None` on an unterminated quote or a dangling escape.
pub fn split_quoted(s: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut chars = s.chars().peekable();
    loop {
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };
        let mut field = String::new();
        if first == '"' {
            chars.next();
            loop {
                match chars.next()? {
                    '"' => break,
                    '\\' => field.push(chars.next()?),
                    other => field.push(other),
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                field.push(c);
                chars.next();
            }
        }
        fields.push(field);
    }
    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_plain() {
        assert_eq!(quote("border"), "\"border\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(quote("\\\""), "\"\\\\\\\"\"");
    }

    #[test]
    fn test_split_plain_tokens() {
        assert_eq!(
            split_quoted("1 two 3.0").unwrap(),
            vec!["1", "two", "3.0"]
        );
        assert_eq!(split_quoted("  spaced\t out  ").unwrap(), vec!["spaced", "out"]);
        assert_eq!(split_quoted("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_split_quoted_fields() {
        assert_eq!(
            split_quoted("2 \"a b\" \"c\"").unwrap(),
            vec!["2", "a b", "c"]
        );
        assert_eq!(split_quoted("\"\"").unwrap(), vec![""]);
    }

    #[test]
    fn test_split_resolves_escapes() {
        assert_eq!(split_quoted("\"a\\\"b\"").unwrap(), vec!["a\"b"]);
        assert_eq!(split_quoted("\"a\\\\b\"").unwrap(), vec!["a\\b"]);
    }

    #[test]
    fn test_split_quote_roundtrip() {
        for text in ["plain", "with space", "q\"uote", "back\\slash", ""] {
            let quoted = quote(text);
            assert_eq!(split_quoted(&quoted).unwrap(), vec![text]);
        }
    }

    #[test]
    fn test_split_malformed() {
        assert!(split_quoted("\"unterminated").is_none());
        assert!(split_quoted("\"dangling\\").is_none());
    }
}
