//! Tabular statement pipeline: header column detection and
//! row-to-transaction mapping.
//!
//! Column names vary by bank, so roles are resolved once per file from
//! the header row and data rows are read positionally after that. A
//! statement with unusual headers still yields transactions, just with
//! degraded data and visible warnings.

use anyhow::{Result, anyhow};
use chrono::Local;
use tracing::{debug, warn};

use bankfeed_core::{
    MerchantExtractor, ParseResult, ParsedTransaction, cap_description, classify,
    clean_money_token, parse_amount, parse_date_or_today,
};

const AMOUNT_KEYWORDS: &[&str] = &["amount", "value", "total", "sum", "price", "cost"];
const DATE_KEYWORDS: &[&str] = &["date", "time", "timestamp", "created", "posted"];
const DESCRIPTION_KEYWORDS: &[&str] = &["description", "memo", "note", "details", "reference", "payee"];
const DEBIT_KEYWORDS: &[&str] = &["debit", "withdrawal", "payment", "out"];
const CREDIT_KEYWORDS: &[&str] = &["credit", "deposit", "income", "in"];

/// Column-role assignments, resolved once per file from the header row.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub amount: Option<usize>,
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
}

impl ColumnMap {
    fn has_amount_source(&self) -> bool {
        self.amount.is_some() || self.debit.is_some() || self.credit.is_some()
    }

    /// Columns holding amount/date/debit/credit values; the description
    /// fallback skips these.
    fn is_value_column(&self, idx: usize) -> bool {
        [self.amount, self.date, self.debit, self.credit]
            .iter()
            .flatten()
            .any(|i| *i == idx)
    }
}

// Short keywords ("in", "out", "sum") match whole words only, so that
// e.g. "Running Bal." cannot become a credit column via "in".
fn header_matches(header: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        if kw.len() >= 4 {
            header.contains(kw)
        } else {
            header
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token == *kw)
        }
    })
}

/// Detect column roles from the header row.
///
/// First match wins per role, header order preserved. Missing roles
/// become warnings, never a refusal to parse.
pub fn detect_columns(headers: &[String]) -> (ColumnMap, Vec<String>) {
    let mut map = ColumnMap::default();
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

    for (idx, header) in lowered.iter().enumerate() {
        if map.amount.is_none() && header_matches(header, AMOUNT_KEYWORDS) {
            map.amount = Some(idx);
        }
        if map.date.is_none() && header_matches(header, DATE_KEYWORDS) {
            map.date = Some(idx);
        }
        if map.description.is_none() && header_matches(header, DESCRIPTION_KEYWORDS) {
            map.description = Some(idx);
        }
        if map.debit.is_none() && header_matches(header, DEBIT_KEYWORDS) {
            map.debit = Some(idx);
        }
        if map.credit.is_none() && header_matches(header, CREDIT_KEYWORDS) {
            map.credit = Some(idx);
        }
    }

    // A dedicated amount column wins outright; debit/credit only apply in
    // the dual-column layout.
    if map.amount.is_some() {
        map.debit = None;
        map.credit = None;
    }

    let mut warnings = Vec::new();
    if !map.has_amount_source() {
        warnings.push("could not detect amount column".to_string());
    }
    if map.date.is_none() {
        warnings.push("could not detect date column".to_string());
    }
    if map.description.is_none() {
        warnings.push("could not detect description column".to_string());
    }
    for warning in &warnings {
        warn!("{warning}");
    }
    (map, warnings)
}

/// Row-based statement parser.
#[derive(Debug)]
pub struct TabularParser {
    merchants: MerchantExtractor,
}

impl TabularParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            merchants: MerchantExtractor::new()?,
        })
    }

    /// Parse a header row plus data rows into a `ParseResult`.
    ///
    /// One malformed row never aborts the file: per-row failures become
    /// `"Error parsing row: ..."` entries and processing continues.
    pub fn parse(&self, headers: &[String], rows: &[Vec<String>]) -> ParseResult {
        let (map, mut errors) = detect_columns(headers);
        debug!(columns = headers.len(), rows = rows.len(), "mapped tabular statement");

        let mut transactions = Vec::new();
        for row in rows {
            match self.build_row(&map, row) {
                Ok(Some(txn)) => transactions.push(txn),
                Ok(None) => {}
                Err(err) => errors.push(format!("Error parsing row: {err}")),
            }
        }

        if transactions.is_empty() {
            errors.push("no transactions could be parsed from the file".to_string());
        }
        ParseResult::new(transactions, errors)
    }

    fn build_row(&self, map: &ColumnMap, row: &[String]) -> Result<Option<ParsedTransaction>> {
        let amount = resolve_amount(map, row)?;

        let mapped_description = map
            .description
            .and_then(|idx| row.get(idx))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_string);
        // Best effort when the description column is missing or blank:
        // first non-empty column not claimed by a value role.
        let description = mapped_description.or_else(|| {
            row.iter()
                .enumerate()
                .find(|(idx, cell)| !map.is_value_column(*idx) && !cell.trim().is_empty())
                .map(|(_, cell)| cell.trim().to_string())
        });
        let description = cap_description(description.as_deref().unwrap_or(""));

        // Structurally blank row: nothing to record, nothing to report.
        if description.is_empty() && amount == 0.0 {
            return Ok(None);
        }

        let date = map
            .date
            .and_then(|idx| row.get(idx))
            .map(|cell| parse_date_or_today(cell))
            .unwrap_or_else(|| Local::now().date_naive());

        let merchant = self.merchants.extract(&description);
        let kind = classify(amount, &description, merchant.as_deref());
        Ok(Some(ParsedTransaction {
            date,
            description,
            merchant,
            amount,
            kind,
        }))
    }
}

/// Amount resolution order: dedicated amount column, then credit minus
/// debit, then a lone debit (negated), then a lone credit, then zero.
fn resolve_amount(map: &ColumnMap, row: &[String]) -> Result<f64> {
    if let Some(idx) = map.amount {
        return money_cell(row, idx);
    }
    match (map.debit, map.credit) {
        (Some(d), Some(c)) => Ok(money_cell(row, c)? - money_cell(row, d)?),
        (Some(d), None) => Ok(-money_cell(row, d)?),
        (None, Some(c)) => money_cell(row, c),
        (None, None) => Ok(0.0),
    }
}

/// Parse one cell as money. Empty or missing cells degrade to zero;
/// non-empty cells that fail to parse are a row-level error.
fn money_cell(row: &[String], idx: usize) -> Result<f64> {
    let raw = row.get(idx).map(|c| c.trim()).unwrap_or("");
    if raw.is_empty() {
        return Ok(0.0);
    }
    parse_amount(&clean_money_token(raw)).ok_or_else(|| anyhow!("unparseable amount {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankfeed_core::TransactionKind;
    use chrono::NaiveDate;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detects_roles_in_any_order() {
        let (map, warnings) = detect_columns(&headers(&["Memo", "Posted", "Value"]));
        assert_eq!(map.description, Some(0));
        assert_eq!(map.date, Some(1));
        assert_eq!(map.amount, Some(2));
        assert!(warnings.is_empty());

        let (map, _) = detect_columns(&headers(&["Transaction Date", "Payee", "Total"]));
        assert_eq!(map.date, Some(0));
        assert_eq!(map.description, Some(1));
        assert_eq!(map.amount, Some(2));
    }

    #[test]
    fn test_first_amount_match_wins() {
        let (map, _) = detect_columns(&headers(&["Amount", "Total", "Date"]));
        assert_eq!(map.amount, Some(0));
    }

    #[test]
    fn test_dual_column_detection() {
        let (map, warnings) = detect_columns(&headers(&["Date", "Description", "Debit", "Credit"]));
        assert_eq!(map.amount, None);
        assert_eq!(map.debit, Some(2));
        assert_eq!(map.credit, Some(3));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_amount_column_excludes_debit_credit() {
        let (map, _) = detect_columns(&headers(&["Date", "Payee", "Amount", "Debit", "Credit"]));
        assert_eq!(map.amount, Some(2));
        assert_eq!(map.debit, None);
        assert_eq!(map.credit, None);
    }

    #[test]
    fn test_short_keywords_do_not_match_substrings() {
        let (map, _) = detect_columns(&headers(&["Date", "Description", "Amount", "Running Bal."]));
        assert_eq!(map.credit, None);
        assert_eq!(map.amount, Some(2));
    }

    #[test]
    fn test_missing_roles_warn_but_do_not_abort() {
        let (map, warnings) = detect_columns(&headers(&["Alpha", "Beta"]));
        assert!(!map.has_amount_source());
        assert_eq!(
            warnings,
            vec![
                "could not detect amount column".to_string(),
                "could not detect date column".to_string(),
                "could not detect description column".to_string(),
            ]
        );
    }

    #[test]
    fn test_dual_column_row() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description", "Debit", "Credit"]),
            &[row(&["03/14/2024", "Grocery Store", "45.20", ""])],
        );
        assert_eq!(result.total_count, 1);
        let txn = &result.transactions[0];
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(txn.description, "Grocery Store");
        assert_eq!(txn.amount, -45.20);
        assert_eq!(txn.kind, TransactionKind::Expense);
    }

    #[test]
    fn test_credit_only_row_is_income() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description", "Debit", "Credit"]),
            &[row(&["03/15/2024", "PAYROLL ACME INC", "", "2,500.00"])],
        );
        assert_eq!(result.transactions[0].amount, 2500.0);
        assert_eq!(result.transactions[0].kind, TransactionKind::Income);
    }

    #[test]
    fn test_parenthesized_amount_cell() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description", "Amount"]),
            &[row(&["03/14/2024", "SERVICE FEE", "(25.00)"])],
        );
        assert_eq!(result.transactions[0].amount, -25.0);
    }

    #[test]
    fn test_blank_row_is_skipped_silently() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description", "Amount"]),
            &[row(&["", "", ""])],
        );
        assert!(result.transactions.is_empty());
        // Only the no-transactions advisory; no per-row error.
        assert!(!result.errors.iter().any(|e| e.starts_with("Error parsing row")));
    }

    #[test]
    fn test_zero_amount_row_with_description_is_kept() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description", "Amount"]),
            &[row(&["03/14/2024", "BALANCE INQUIRY", ""])],
        );
        assert_eq!(result.total_count, 1);
        assert_eq!(result.transactions[0].amount, 0.0);
    }

    #[test]
    fn test_bad_amount_is_row_error_and_parsing_continues() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description", "Amount"]),
            &[
                row(&["03/14/2024", "GOOD ROW", "10.00"]),
                row(&["03/15/2024", "BAD ROW", "n/a"]),
                row(&["03/16/2024", "ANOTHER GOOD ROW", "20.00"]),
            ],
        );
        assert_eq!(result.total_count, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Error parsing row:"));
    }

    #[test]
    fn test_description_falls_back_to_first_unmapped_column() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Details", "Amount", "Extra"]),
            &[row(&["03/14/2024", "", "12.00", "CARD 1234"])],
        );
        // Mapped description is blank; the unmapped "Extra" column fills in.
        assert_eq!(result.transactions[0].description, "CARD 1234");
    }

    #[test]
    fn test_no_amount_column_degrades_to_zero() {
        let parser = TabularParser::new().unwrap();
        let result = parser.parse(
            &headers(&["Date", "Description"]),
            &[row(&["03/14/2024", "MYSTERY CHARGE"])],
        );
        assert_eq!(result.total_count, 1);
        assert_eq!(result.transactions[0].amount, 0.0);
        assert!(result.errors.contains(&"could not detect amount column".to_string()));
    }
}
