use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("number pattern is valid"));

static RANGE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-–]\s*$").expect("range separator pattern is valid"));

/// A numeric substring of a line with its byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberToken {
    pub value: Decimal,
    pub start: usize,
    pub end: usize,
}

/// Find all numeric substrings of a line (integer or decimal), left to right.
///
/// Digits glued to a preceding letter belong to a test name ("HbA1c",
/// "Vitamin B12", "T3") and are not reported. No sign or exponent handling.
pub fn number_tokens(line: &str) -> Vec<NumberToken> {
    NUMBER
        .find_iter(line)
        .filter(|m| {
            !line[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphabetic())
        })
        .filter_map(|m| {
            Decimal::from_str(m.as_str()).ok().map(|value| NumberToken {
                value,
                start: m.start(),
                end: m.end(),
            })
        })
        .collect()
}

/// First `<number> - <number>` (hyphen or en dash) pair among the tokens.
pub fn inline_range(line: &str, tokens: &[NumberToken]) -> Option<(Decimal, Decimal)> {
    tokens.windows(2).find_map(|pair| {
        let gap = &line[pair[0].end..pair[1].start];
        if RANGE_SEPARATOR.is_match(gap) {
            Some((pair[0].value, pair[1].value))
        } else {
            None
        }
    })
}

/// Parse a reference-range string such as `"13.0 - 17.0"` or `"(70–99)"`.
///
/// Accepts hyphen, en dash and em dash separators.
pub fn parse_range_text(s: &str) -> Option<(Decimal, Decimal)> {
    static RANGE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(\d+(?:\.\d+)?)\s*[-–—]\s*(\d+(?:\.\d+)?)").expect("range text pattern is valid")
    });
    let caps = RANGE_TEXT.captures(s)?;
    let lower = Decimal::from_str(caps.get(1)?.as_str()).ok()?;
    let upper = Decimal::from_str(caps.get(2)?.as_str()).ok()?;
    Some((lower, upper))
}
