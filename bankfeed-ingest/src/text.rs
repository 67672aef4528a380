//! Plain-text statement pipeline for text extracted from PDF statements.
//!
//! PDF extraction yields unstructured monospace lines where one
//! transaction spans several physical lines. Each line is classified as
//! statement furniture (dropped), a record start (leads with a date), or
//! a continuation of the current record. A single accumulator assembles
//! the current record and is flushed when the next record starts or the
//! input ends; the whole pass is single left-to-right with no
//! backtracking.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use bankfeed_core::{
    MerchantExtractor, MoneyScanner, ParseResult, ParsedTransaction, TransactionKind,
    cap_description, classify, clean_money_token, collapse_whitespace, has_keyword_evidence,
    parse_amount, parse_date_or_today,
};

use crate::dedup::dedupe_transactions;

const EPSILON: f64 = 1e-9;
const MIN_DESCRIPTION_LEN: usize = 3;

/// Substrings marking statement furniture: column headings, page footers,
/// section banners. Matched case-insensitively; these lines must never
/// become part of a description or be mistaken for a date line.
const NOISE_MARKERS: &[&str] = &[
    "activity in date order",
    "date description",
    "totally free checking",
    "continued",
    "withdrawals",
    "deposits",
    "balance",
];

enum LineKind<'a> {
    Noise,
    RecordStart { date: &'a str, rest: &'a str },
    Continuation,
}

/// In-progress multi-line record. Exactly one is live at a time.
struct PendingRecord {
    date: NaiveDate,
    description_lines: Vec<String>,
    raw_money_tokens: Vec<String>,
}

/// Parser for text extracted from PDF statements.
pub struct TextStatementParser {
    date_start_re: Regex,
    column_gap_re: Regex,
    money: MoneyScanner,
    merchants: MerchantExtractor,
}

impl TextStatementParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            date_start_re: Regex::new(r"^\s*(\d{1,2}/\d{1,2}(?:/\d{2,4})?)")?,
            column_gap_re: Regex::new(r"\s{2,}")?,
            money: MoneyScanner::new()?,
            merchants: MerchantExtractor::new()?,
        })
    }

    /// Parse extracted statement text into transactions.
    pub fn parse(&self, text: &str) -> ParseResult {
        if text.trim().is_empty() {
            return ParseResult::failure(
                "PDF appears to be empty or has no extractable text; it may require OCR",
            );
        }

        let mut transactions = Vec::new();
        let mut pending: Option<PendingRecord> = None;

        for line in text.lines() {
            match self.classify_line(line) {
                LineKind::Noise => {}
                LineKind::RecordStart { date, rest } => {
                    // Flush-then-start is atomic from the caller's view.
                    if let Some(record) = pending.take() {
                        self.flush(record, &mut transactions);
                    }
                    pending = Some(self.start_record(date, rest));
                }
                LineKind::Continuation => {
                    // Continuations before the first date line are discarded.
                    if let Some(record) = pending.as_mut() {
                        self.continue_record(record, line);
                    }
                }
            }
        }
        if let Some(record) = pending.take() {
            self.flush(record, &mut transactions);
        }

        let transactions = dedupe_transactions(transactions);
        debug!(count = transactions.len(), "assembled plain-text transactions");

        let mut errors = Vec::new();
        if transactions.is_empty() {
            errors.push(
                "no transactions found in statement text; the PDF may be a scanned image requiring OCR"
                    .to_string(),
            );
        }
        ParseResult::new(transactions, errors)
    }

    fn classify_line<'a>(&self, line: &'a str) -> LineKind<'a> {
        let lowered = line.to_lowercase();
        if NOISE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            return LineKind::Noise;
        }
        let trimmed = line.trim();
        if trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-') {
            return LineKind::Noise;
        }
        if let Some(caps) = self.date_start_re.captures(line) {
            if let Some(date) = caps.get(1) {
                return LineKind::RecordStart {
                    date: date.as_str(),
                    rest: &line[date.end()..],
                };
            }
        }
        LineKind::Continuation
    }

    fn start_record(&self, date: &str, rest: &str) -> PendingRecord {
        let raw_money_tokens = self.money.extract(rest);
        // Initial fragment: text after the date up to the first column gap.
        let lead = rest.trim_start();
        let fragment = self
            .column_gap_re
            .split(lead)
            .next()
            .unwrap_or("")
            .trim()
            .to_string();
        let mut description_lines = Vec::new();
        if !fragment.is_empty() {
            description_lines.push(fragment);
        }
        PendingRecord {
            date: parse_date_or_today(date),
            description_lines,
            raw_money_tokens,
        }
    }

    fn continue_record(&self, record: &mut PendingRecord, line: &str) {
        let tokens = self.money.extract(line);
        if tokens.is_empty() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                record.description_lines.push(trimmed.to_string());
            }
            return;
        }
        record.raw_money_tokens.extend(tokens);
        let stripped = self.money.strip(line);
        let stripped = stripped.trim();
        if !stripped.is_empty() {
            record.description_lines.push(collapse_whitespace(stripped));
        }
    }

    fn flush(&self, record: PendingRecord, out: &mut Vec<ParsedTransaction>) {
        let (withdrawal, deposit) = split_money_tokens(&record.raw_money_tokens);

        let description =
            cap_description(&collapse_whitespace(&record.description_lines.join(" ")));
        // Mirror of the tabular blank-row skip: nothing worth emitting.
        if description.chars().count() < MIN_DESCRIPTION_LEN
            && withdrawal < EPSILON
            && deposit < EPSILON
        {
            return;
        }

        let amount = if withdrawal > 0.0 { -withdrawal } else { deposit };
        let merchant = self.merchants.extract(&description);
        let kind = if withdrawal < EPSILON
            && deposit < EPSILON
            && !has_keyword_evidence(&description, merchant.as_deref())
        {
            // Numeric default for a zero-amount record with no keyword
            // evidence to override it.
            TransactionKind::Transfer
        } else {
            classify(amount, &description, merchant.as_deref())
        };

        out.push(ParsedTransaction {
            date: record.date,
            description,
            merchant,
            amount,
            kind,
        });
    }
}

/// One parsed money token: absolute value plus its negative marker.
struct MoneyValue {
    abs: f64,
    negative: bool,
}

fn money_value(raw: &str) -> MoneyValue {
    let value = parse_amount(&clean_money_token(raw)).unwrap_or(0.0);
    MoneyValue {
        abs: value.abs(),
        negative: value < 0.0,
    }
}

/// Assign withdrawal and deposit from the record's raw token run.
///
/// Three or more tokens means the record carries the statement's
/// withdrawal/deposit/balance columns; fewer tokens need the sign
/// markers to disambiguate.
fn split_money_tokens(tokens: &[String]) -> (f64, f64) {
    let values: Vec<MoneyValue> = tokens.iter().map(|t| money_value(t)).collect();
    match values.len() {
        0 => (0.0, 0.0),
        1 => {
            let only = &values[0];
            if only.negative {
                (only.abs, 0.0)
            } else {
                (0.0, only.abs)
            }
        }
        2 => {
            let (first, second) = (&values[0], &values[1]);
            if first.negative && !second.negative {
                // Withdrawal plus trailing balance; no deposit column.
                (first.abs, 0.0)
            } else {
                // Order-dependent fallback: an unmarked token keeps its
                // column slot, a marked one contributes nothing.
                let withdrawal = if !first.negative { first.abs } else { 0.0 };
                let deposit = if !second.negative { second.abs } else { 0.0 };
                (withdrawal, deposit)
            }
        }
        n => {
            // Last three tokens are withdrawal, deposit, balance.
            let withdrawal = values[n - 3].abs;
            let deposit = values[n - 2].abs;
            (withdrawal, deposit)
        }
    }
}
