//! Within-batch duplicate suppression for the plain-text pipeline.

use std::collections::HashSet;

use bankfeed_core::ParsedTransaction;
use chrono::NaiveDate;

const PREFIX_LEN: usize = 30;

/// Collapse records sharing a fingerprint of (date, cent-rounded amount,
/// first 30 chars of description), keeping the first occurrence in the
/// original order.
///
/// Guards against a statement line being double-counted when a record
/// start and a continuation line both carry matching money tokens.
pub fn dedupe_transactions(transactions: Vec<ParsedTransaction>) -> Vec<ParsedTransaction> {
    let mut seen: HashSet<(NaiveDate, i64, String)> = HashSet::new();
    let mut kept = Vec::with_capacity(transactions.len());
    for txn in transactions {
        let cents = (txn.amount * 100.0).round() as i64;
        let prefix: String = txn.description.chars().take(PREFIX_LEN).collect();
        if seen.insert((txn.date, cents, prefix)) {
            kept.push(txn);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankfeed_core::TransactionKind;

    fn txn(date: (i32, u32, u32), amount: f64, description: &str) -> ParsedTransaction {
        ParsedTransaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: description.to_string(),
            merchant: None,
            amount,
            kind: TransactionKind::Expense,
        }
    }

    #[test]
    fn test_collapses_matching_fingerprints_keeping_first() {
        let first = txn((2024, 3, 14), -45.67, "WALMART SUPERCENTER");
        let near_duplicate = txn((2024, 3, 14), -45.672, "WALMART SUPERCENTER");
        let kept = dedupe_transactions(vec![first.clone(), near_duplicate]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0], first);
    }

    #[test]
    fn test_prefix_only_comparison() {
        let long_a = txn((2024, 3, 14), -10.0, &format!("{} branch A", "x".repeat(30)));
        let long_b = txn((2024, 3, 14), -10.0, &format!("{} branch B", "x".repeat(30)));
        let kept = dedupe_transactions(vec![long_a, long_b]);
        // Identical 30-char prefixes collapse even when the tails differ.
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_different_dates_or_amounts_survive() {
        let a = txn((2024, 3, 14), -45.67, "WALMART");
        let b = txn((2024, 3, 15), -45.67, "WALMART");
        let c = txn((2024, 3, 14), -45.69, "WALMART");
        let kept = dedupe_transactions(vec![a, b, c]);
        assert_eq!(kept.len(), 3);
    }
}
