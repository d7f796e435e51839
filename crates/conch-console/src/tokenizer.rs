//! Quote/escape-aware argument splitting.
//!
//! A line is consumed token by token. Quoted spans (single or double) form
//! one argument with the quotes stripped and escaped quotes unescaped; an
//! unterminated quote is not fatal -- the opening quote is demoted to a
//! literal character and the token ends at the next whitespace.

use crate::arg::Argument;

/// Eat one token from the front of `input`.
///
/// Returns the token and the remaining input, or `None` once the input is
/// exhausted. A quoted empty span (`""` or `''`) yields an empty token,
/// which is a valid argument, not a skip.
pub fn next_token(input: &str) -> Option<(String, &str)> {
    let s = input.trim_start();
    let first = s.chars().next()?;

    if (first == '"' || first == '\'')
        && let Some(close) = find_closing_quote(s, first)
    {
        let token = unescape_quotes(&s[1..close], first);
        return Some((token, &s[close + 1..]));
    }

    // Unquoted token, or unterminated-quote fallback: split at whitespace.
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((s[..end].to_string(), &s[end..]))
}

/// Tokenize a whole line into arguments.
pub fn tokenize(line: &str) -> Vec<Argument> {
    let mut args = Vec::new();
    let mut rest = line;
    while let Some((token, next)) = next_token(rest) {
        args.push(Argument::new(token));
        rest = next;
    }
    args
}

/// Byte index of the closing quote in `s` (which starts with `quote`).
///
/// A quote preceded by an odd number of consecutive backslashes is escaped
/// and skipped. Returns `None` when the span never closes.
fn find_closing_quote(s: &str, quote: char) -> Option<usize> {
    let mut backslashes = 0;
    for (i, ch) in s.char_indices() {
        if i == 0 {
            continue;
        }
        if ch == '\\' {
            backslashes += 1;
        } else {
            if ch == quote && backslashes % 2 == 0 {
                return Some(i);
            }
            backslashes = 0;
        }
    }
    None
}

/// Rewrite `\"` -> `"` (or `\'` -> `'`) inside a captured quoted span.
fn unescape_quotes(span: &str, quote: char) -> String {
    let escaped: String = ['\\', quote].iter().collect();
    span.replace(&escaped, &quote.to_string())
}
