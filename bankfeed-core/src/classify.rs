//! Transaction-type inference from description keywords and amount sign.
//!
//! Keyword evidence outranks the raw sign: bank export conventions for
//! amount signs are inconsistent, descriptive text is comparatively
//! reliable.

use crate::transaction::TransactionKind;

const TRANSFER_KEYWORDS: &[&str] = &[
    "transfer",
    "xfer",
    "move money",
    "between accounts",
    "internal transfer",
];

const INCOME_KEYWORDS: &[&str] = &[
    "deposit",
    "salary",
    "payroll",
    "direct deposit",
    "refund",
    "tax refund",
    "interest",
    "dividend",
    "cashback",
    "cash back",
    "reimbursement",
    "credit memo",
];

const EXPENSE_KEYWORDS: &[&str] = &[
    "purchase",
    "charge",
    "debit",
    "fee",
    "subscription",
    "withdrawal",
    "bill pay",
];

// Matched as whole tokens so that e.g. "deposit" cannot trip the scan.
const EXPENSE_TOKENS: &[&str] = &["pos"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

fn has_token(text: &str, tokens: &[&str]) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| tokens.contains(&word))
}

fn indicator_text(description: &str, merchant: Option<&str>) -> String {
    let mut text = description.to_lowercase();
    if let Some(m) = merchant {
        text.push(' ');
        text.push_str(&m.to_lowercase());
    }
    text
}

fn has_income_indicator(text: &str) -> bool {
    contains_any(text, INCOME_KEYWORDS)
}

fn has_expense_indicator(text: &str) -> bool {
    contains_any(text, EXPENSE_KEYWORDS) || has_token(text, EXPENSE_TOKENS)
}

/// True when the description carries any transfer/income/expense keyword.
///
/// The plain-text flush uses this to decide whether keyword evidence
/// should override its numeric default for zero-amount records.
pub fn has_keyword_evidence(description: &str, merchant: Option<&str>) -> bool {
    let text = indicator_text(description, merchant);
    contains_any(&text, TRANSFER_KEYWORDS)
        || has_income_indicator(&text)
        || has_expense_indicator(&text)
}

/// Classify a transaction.
///
/// Priority: transfer keywords win unconditionally; income/expense
/// indicators then arbitrate against the amount sign (some banks post
/// expenses as positive numbers under a "debit" label, and income as
/// negative under a "credit" label); a zero amount falls back to
/// whichever indicator is present, defaulting to expense.
pub fn classify(amount: f64, description: &str, merchant: Option<&str>) -> TransactionKind {
    let text = indicator_text(description, merchant);

    if contains_any(&text, TRANSFER_KEYWORDS) {
        return TransactionKind::Transfer;
    }

    let income = has_income_indicator(&text);
    let expense = has_expense_indicator(&text);

    if amount > 0.0 {
        if expense && !income {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    } else if amount < 0.0 {
        if income && !expense {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        }
    } else if income {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    }
}
