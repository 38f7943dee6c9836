//! Query canonicalization.
//!
//! Raw company names arrive from CRM records with disambiguating noise:
//! parenthetical asides, stylized punctuation, curly quotes. Normalizing
//! before every lookup keeps cache keys aligned across callers and improves
//! search recall at the same time.

/// Canonicalize free-text input into the form used for cache keys and
/// outbound queries.
///
/// - drops parenthesized segments entirely
/// - maps `&` and `/` to spaces
/// - maps curly quotes to their straight equivalents
/// - strips everything outside word characters, spaces, quotes, and hyphens
/// - collapses whitespace runs and trims the ends
///
/// Case is preserved. The function is idempotent: normalizing an already
/// normalized string returns it unchanged.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut paren_depth = 0u32;

    for c in raw.chars() {
        match c {
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            _ if paren_depth > 0 => {}
            '&' | '/' => cleaned.push(' '),
            '\u{2018}' | '\u{2019}' => cleaned.push('\''),
            '\u{201C}' | '\u{201D}' => cleaned.push('"'),
            c if c.is_alphanumeric() || matches!(c, '_' | '\'' | '"' | '-') => cleaned.push(c),
            c if c.is_whitespace() => cleaned.push(' '),
            _ => {}
        }
    }

    // Collapse whitespace runs and trim in one pass.
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
