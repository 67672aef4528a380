//! Normalized transaction types shared by both parsing pipelines.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Descriptions longer than this are truncated before a transaction is built.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Closed set of transaction types inferred by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "transfer")]
    Transfer,
}

/// Normalized output of the statement parsers (bank-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    /// Statement date; unparseable input dates fall back to today.
    pub date: NaiveDate,
    pub description: String,
    pub merchant: Option<String>,
    /// Negative means money leaving the account; positive means money entering.
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Outcome of parsing one statement file.
///
/// `errors` is advisory and non-fatal: a non-empty list does not imply
/// `transactions` is empty, and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub transactions: Vec<ParsedTransaction>,
    pub total_count: usize,
    pub errors: Vec<String>,
}

impl ParseResult {
    /// Build a result; `total_count` is always derived from `transactions`.
    pub fn new(transactions: Vec<ParsedTransaction>, errors: Vec<String>) -> Self {
        let total_count = transactions.len();
        Self {
            transactions,
            total_count,
            errors,
        }
    }

    /// Empty result carrying a single file-level error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            transactions: Vec::new(),
            total_count: 0,
            errors: vec![message.into()],
        }
    }
}

/// Trim and cap a description at `MAX_DESCRIPTION_LEN` characters.
pub fn cap_description(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= MAX_DESCRIPTION_LEN {
        trimmed.to_string()
    } else {
        trimmed.chars().take(MAX_DESCRIPTION_LEN).collect()
    }
}

/// Collapse interior whitespace runs into single spaces.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
