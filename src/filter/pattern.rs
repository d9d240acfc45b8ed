use regex::Regex;
use std::borrow::Cow;

/// Wildcard pattern with SQL `LIKE` semantics: `%` matches any run of
/// characters, `_` exactly one, `\` escapes the next wildcard. Matching is
/// anchored to the whole value and case-sensitive.
#[derive(Debug, Clone)]
pub enum WildcardPattern {
    /// No wildcard at all
    Exact(String),
    /// `text%`
    Prefix(String),
    /// `%text`
    Suffix(String),
    /// `%text%`
    Contains(String),
    /// Anything else
    Regex(Regex),
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern.strip_prefix('%').unwrap_or(pattern);
        let has_leading = body.len() != pattern.len();
        let (inner, has_trailing) = match body.strip_suffix('%') {
            Some(rest) if !rest.ends_with('\\') => (rest, true),
            _ => (body, false),
        };

        if !inner.contains(['%', '_', '\\']) {
            let inner = inner.to_string();
            return Ok(match (has_leading, has_trailing) {
                (false, false) => WildcardPattern::Exact(inner),
                (false, true) => WildcardPattern::Prefix(inner),
                (true, false) => WildcardPattern::Suffix(inner),
                (true, true) => WildcardPattern::Contains(inner),
            });
        }

        Regex::new(&format!("^(?s:{})$", wildcard_to_regex(pattern))).map(WildcardPattern::Regex)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            WildcardPattern::Exact(s) => value == s,
            WildcardPattern::Prefix(s) => value.starts_with(s.as_str()),
            WildcardPattern::Suffix(s) => value.ends_with(s.as_str()),
            WildcardPattern::Contains(s) => value.contains(s.as_str()),
            WildcardPattern::Regex(re) => re.is_match(value),
        }
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    let mut buf = [0u8; 4];

    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => match chars.next() {
                Some(next) => out.push_str(&regex::escape(next.encode_utf8(&mut buf))),
                None => out.push_str(r"\\"),
            },
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }

    out
}

/// Remove `\r` and `\n` so multi-line messages match like single lines
pub fn strip_line_breaks(value: &str) -> Cow<'_, str> {
    if value.contains(['\r', '\n']) {
        Cow::Owned(value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect())
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, value: &str) -> bool {
        WildcardPattern::compile(pattern).unwrap().matches(value)
    }

    #[test]
    fn test_fast_paths() {
        assert!(matches!(
            WildcardPattern::compile("abc").unwrap(),
            WildcardPattern::Exact(_)
        ));
        assert!(matches!(
            WildcardPattern::compile("abc%").unwrap(),
            WildcardPattern::Prefix(_)
        ));
        assert!(matches!(
            WildcardPattern::compile("%abc").unwrap(),
            WildcardPattern::Suffix(_)
        ));
        assert!(matches!(
            WildcardPattern::compile("%abc%").unwrap(),
            WildcardPattern::Contains(_)
        ));
        assert!(matches!(
            WildcardPattern::compile("ERR_%").unwrap(),
            WildcardPattern::Regex(_)
        ));
    }

    #[test]
    fn test_anchored_full_match() {
        assert!(matches("test", "test"));
        assert!(!matches("test", "testEx"));
        assert!(!matches("test", "a test"));
        assert!(matches("%", ""));
        assert!(matches("%", "anything"));
    }

    #[test]
    fn test_wildcards() {
        assert!(matches("ERR_%", "ERR_101"));
        assert!(!matches("ERR_%", "WARN_101"));
        assert!(matches("a_c", "abc"));
        assert!(!matches("a_c", "abbc"));
        assert!(matches("%dis_ _ull%", "the disk full error"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("a.c%", "a.c1"));
        assert!(!matches("a.c%", "abc1"));
        assert!(matches("(x)%[y]", "(x) and [y]"));
    }

    #[test]
    fn test_escaped_wildcards() {
        assert!(matches(r"100\%", "100%"));
        assert!(!matches(r"100\%", "1000"));
        assert!(matches(r"a\_b", "a_b"));
        assert!(!matches(r"a\_b", "axb"));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches("error%", "ERROR here"));
    }

    #[test]
    fn test_strip_line_breaks() {
        assert_eq!(strip_line_breaks("a\r\nb\nc\rd"), "abcd");
        assert!(matches!(strip_line_breaks("plain"), Cow::Borrowed(_)));
    }
}
