//! Natural (alphanumeric) string ordering.
//!
//! Plain string comparison misorders numeric suffixes (`C10` < `C9`).
//! [`natural_cmp`] splits each name into alternating non-digit/digit runs
//! and compares digit runs by numeric value, so `C9` sorts before `C10`.

use std::cmp::Ordering;

/// One run of a tokenized name: either digits or everything else.
#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(&'a str),
}

/// Split a name into alternating text/digit runs.
fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev == is_digit => {}
            Some(prev) => {
                tokens.push(if prev {
                    Token::Number(&s[start..i])
                } else {
                    Token::Text(&s[start..i])
                });
                start = i;
                in_digits = Some(is_digit);
            }
            None => in_digits = Some(is_digit),
        }
    }

    if let Some(prev) = in_digits {
        tokens.push(if prev {
            Token::Number(&s[start..])
        } else {
            Token::Text(&s[start..])
        });
    }

    tokens
}

/// Compare two digit runs numerically without overflow: strip leading
/// zeros, then longer runs are larger, then compare digit-by-digit.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two names in natural order.
///
/// Digit runs compare by numeric value; text runs compare
/// case-insensitively, falling back to a case-sensitive comparison so the
/// ordering stays total. A number sorts before text at the same position.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ta = tokenize(a);
    let tb = tokenize(b);

    for pair in ta.iter().zip(tb.iter()) {
        let ord = match pair {
            (Token::Number(x), Token::Number(y)) => cmp_digits(x, y),
            (Token::Text(x), Token::Text(y)) => x
                .to_lowercase()
                .cmp(&y.to_lowercase())
                .then_with(|| x.cmp(y)),
            (Token::Number(_), Token::Text(_)) => Ordering::Less,
            (Token::Text(_), Token::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    ta.len().cmp(&tb.len()).then_with(|| a.cmp(b))
}
