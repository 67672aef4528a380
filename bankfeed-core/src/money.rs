//! Money-token extraction and amount normalization.
//!
//! Statement layouts sign amounts three ways: parentheses `(1,234.56)`,
//! a trailing dash `123.45-`, or split debit/credit columns. Extraction
//! finds the raw tokens on a line; `clean_money_token` reduces a token to
//! a prefix-signed decimal string; `parse_amount` yields the value.

use anyhow::Result;
use regex::Regex;

/// Per-line money-token scanner.
///
/// The pattern set is compiled once and used immutably; extraction is
/// applied per line, never across the whole text.
#[derive(Debug)]
pub struct MoneyScanner {
    token_re: Regex,
}

impl MoneyScanner {
    pub fn new() -> Result<Self> {
        // Three alternatives: grouped decimals in parentheses (optionally
        // dash-suffixed), plain decimals with optional trailing dash, and
        // the bare `.00` some layouts print for an empty column.
        let token_re = Regex::new(concat!(
            r"\(\$?\d{1,3}(?:,\d{3})*\.\d{2}\)-?",
            r"|\$?\d{1,3}(?:,\d{3})*\.\d{2}-?",
            r"|\d+\.\d{2}-?",
            r"|\.00",
        ))?;
        Ok(Self { token_re })
    }

    /// All raw money tokens on one line, left to right.
    pub fn extract(&self, line: &str) -> Vec<String> {
        self.token_re
            .find_iter(line)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// The line with every money token removed.
    pub fn strip(&self, line: &str) -> String {
        self.token_re.replace_all(line, "").to_string()
    }
}

/// Normalize a raw token: parenthesized tokens become `-`-prefixed; a
/// trailing `-` is left in place for `parse_amount` to interpret.
pub fn clean_money_token(token: &str) -> String {
    let t = token.trim();
    if let Some(inner) = t.strip_prefix('(') {
        let inner = inner
            .strip_suffix(")-")
            .or_else(|| inner.strip_suffix(')'))
            .unwrap_or(inner);
        return format!("-{inner}");
    }
    t.to_string()
}

/// Parse a normalized token into a signed value.
///
/// Returns `None` (not zero) when the token is not numeric: zero is a
/// valid deposit/withdrawal amount, `None` means absent.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == ".00" {
        return Some(0.0);
    }
    let (body, negate) = match trimmed.strip_suffix('-') {
        Some(stripped) => (stripped, true),
        None => (trimmed, false),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    Some(if negate { -value } else { value })
}
