use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Ordered so that violations derived from a token set come out in a stable order.
pub type TokenSet = BTreeSet<String>;

/// Runs of ASCII digits (compiled once via LazyLock).
static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Normalize a free-text clinical field into a set of comparable tokens.
///
/// Splits on `,` `;` `|` and newlines, trims and lowercases each piece, and
/// drops empty pieces. Absent or blank input yields an empty set.
pub fn tokens(raw: Option<&str>) -> TokenSet {
    let Some(raw) = raw else {
        return TokenSet::new();
    };
    raw.split(|c| matches!(c, ',' | ';' | '|' | '\n'))
        .map(|piece| piece.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

/// First run of digits in `text` no longer than `digits_limit`, scanning left
/// to right. Longer runs are skipped, not truncated.
pub fn extract_first_integer(text: &str, digits_limit: usize) -> Option<u32> {
    RE_DIGITS
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|run| run.len() <= digits_limit)
        .find_map(|run| run.parse::<u32>().ok())
}

/// Lowercased text, empty when absent.
pub(crate) fn lower_or_empty(value: Option<&str>) -> String {
    value.map(str::to_lowercase).unwrap_or_default()
}

/// True when the value is absent or only whitespace.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> TokenSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokens_split_on_all_delimiters() {
        assert_eq!(
            tokens(Some("Penicillin, aspirin;Ibuprofen|codeine\nSulfa")),
            set(&["penicillin", "aspirin", "ibuprofen", "codeine", "sulfa"])
        );
    }

    #[test]
    fn tokens_trim_lowercase_and_dedupe() {
        assert_eq!(
            tokens(Some("  Penicillin ,PENICILLIN,, penicillin ")),
            set(&["penicillin"])
        );
    }

    #[test]
    fn tokens_absent_or_blank_is_empty() {
        assert!(tokens(None).is_empty());
        assert!(tokens(Some("")).is_empty());
        assert!(tokens(Some("   \n ; , |")).is_empty());
    }

    #[test]
    fn tokens_keep_inner_whitespace() {
        assert_eq!(
            tokens(Some("type 2 diabetes; Renal Failure")),
            set(&["type 2 diabetes", "renal failure"])
        );
    }

    #[test]
    fn tokens_handle_crlf() {
        assert_eq!(tokens(Some("asthma\r\ngout")), set(&["asthma", "gout"]));
    }

    #[test]
    fn first_integer_respects_digit_limit() {
        assert_eq!(extract_first_integer("max 5 per day", 4), Some(5));
        assert_eq!(extract_first_integer("max 12345 units, or 30 days", 4), Some(30));
        assert_eq!(extract_first_integer("max 1000mg / 24h", 4), Some(1000));
        assert_eq!(extract_first_integer("no numbers here", 4), None);
        assert_eq!(extract_first_integer("", 4), None);
    }

    #[test]
    fn first_integer_first_match_wins() {
        assert_eq!(extract_first_integer("max 0 then 7", 4), Some(0));
        assert_eq!(extract_first_integer("dose 2x, max 10", 4), Some(2));
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  ")));
        assert!(!is_blank(Some("max 5")));
        assert_eq!(lower_or_empty(Some("Daily")), "daily");
        assert_eq!(lower_or_empty(None), "");
    }
}
