//! bankfeed-core: shared statement-parsing primitives (transaction types,
//! money tokens, dates, type classification, merchant extraction).

pub mod classify;
pub mod date;
pub mod merchant;
pub mod money;
pub mod transaction;

pub use classify::{classify, has_keyword_evidence};
pub use date::{parse_date_or_today, parse_statement_date};
pub use merchant::MerchantExtractor;
pub use money::{MoneyScanner, clean_money_token, parse_amount};
pub use transaction::{
    MAX_DESCRIPTION_LEN, ParseResult, ParsedTransaction, TransactionKind, cap_description,
    collapse_whitespace,
};
