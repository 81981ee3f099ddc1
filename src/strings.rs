//! Small text utilities shared by the reference provider and the notifier
//! runtime: `snake_case` conversion for deriving bot command names, a
//! keyword include/exclude matcher, HTML tag stripping, and thousands-
//! separated integer formatting.

/// Convert an identifier to `snake_case`, inserting `_` at camelCase and
/// PascalCase boundaries and lower-casing everything. Existing separators
/// (`-`, ` `) are normalized to `_`. Used to derive bot command names from
/// `TaskId`/`CommandId` values that may themselves be written in any case.
pub fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower_or_digit = false;
    for ch in s.chars() {
        if ch == '-' || ch == ' ' || ch == '_' {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            prev_lower_or_digit = false;
            continue;
        }
        if ch.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_alphanumeric();
        }
    }
    out.trim_matches('_').to_string()
}

/// Strip HTML tags from a string. The reference provider's upstream search
/// API wraps matched query terms in `<b>...</b>`; leaving those tags in
/// place would let excluded keywords hide inside a tag attribute-free markup
/// soup and dodge the keyword matcher.
pub fn strip_html_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Normalize a string for matching: lower-case, collapse surrounding
/// whitespace. Case and whitespace differences between a keyword and the
/// title it's matched against must not defeat the matcher.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// `true` iff `title` should be retained given the include/exclude keyword
/// lists. Included keywords are OR'd (any substring match keeps the item,
/// an empty list keeps everything); excluded keywords are OR'd the other
/// way (any substring match rejects the item).
pub fn keyword_matches(title: &str, included: &[String], excluded: &[String]) -> bool {
    let title = normalize(title);

    if !included.is_empty() && !included.iter().any(|k| title.contains(&normalize(k))) {
        return false;
    }
    if excluded.iter().any(|k| title.contains(&normalize(k))) {
        return false;
    }
    true
}

/// Render an integer with `,` thousands separators. Negative numbers are
/// not expected here (prices are validated positive before rendering) but
/// are handled correctly for completeness.
pub fn thousands(n: i64) -> String {
    let negative = n < 0;
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Parse a possibly comma-separated decimal integer (the reference
/// provider's upstream API renders `lprice` as e.g. `"12,345"`).
pub fn parse_comma_int(s: &str) -> Option<i64> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_handles_camel_and_pascal() {
        assert_eq!(snake_case("WatchPrice"), "watch_price");
        assert_eq!(snake_case("watchPriceAny"), "watch_price_any");
        assert_eq!(snake_case("navershopping"), "navershopping");
        assert_eq!(snake_case("Naver Shopping"), "naver_shopping");
        assert_eq!(snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn strip_html_tags_removes_bold_wrapping() {
        assert_eq!(strip_html_tags("<b>테스트</b> 상품"), "테스트 상품");
        assert_eq!(strip_html_tags("no tags here"), "no tags here");
    }

    #[test]
    fn keyword_matches_requires_any_included_and_no_excluded() {
        assert!(keyword_matches("테스트 상품", &["테스트".into()], &[]));
        assert!(!keyword_matches("다른 상품", &["테스트".into()], &[]));
        assert!(!keyword_matches(
            "테스트 상품 중고",
            &["테스트".into()],
            &["중고".into()]
        ));
        assert!(keyword_matches("아무거나", &[], &[]));
    }

    #[test]
    fn keyword_matches_is_case_and_whitespace_insensitive() {
        assert!(keyword_matches("  HELLO world  ", &["hello".into()], &[]));
    }

    #[test]
    fn thousands_groups_digits() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(100), "100");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
        assert_eq!(thousands(-42000), "-42,000");
    }

    #[test]
    fn parse_comma_int_strips_separators() {
        assert_eq!(parse_comma_int("10,000"), Some(10000));
        assert_eq!(parse_comma_int("0"), Some(0));
        assert_eq!(parse_comma_int("not a number"), None);
    }
}
