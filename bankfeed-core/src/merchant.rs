//! Merchant extraction from free-text descriptions.

use anyhow::Result;
use regex::Regex;

/// Extracts a short merchant token from a transaction description.
///
/// Three ordered patterns; the first capture wins. No match is an
/// expected outcome, not an error.
#[derive(Debug)]
pub struct MerchantExtractor {
    patterns: Vec<Regex>,
}

impl MerchantExtractor {
    pub fn new() -> Result<Self> {
        let patterns = vec![
            // Leading all-caps run: "WALMART SUPERCENTER #1234"
            Regex::new(r"^([A-Z][A-Z0-9&.'\-]{2,}(?:\s+[A-Z][A-Z0-9&.'\-]*)*)")?,
            // Name-like prefix up to the first digit: "Amazon 1234"
            Regex::new(r"^([A-Za-z][A-Za-z&.,'\- ]+?)\s*#?\d")?,
            // Name-like string consuming the whole description
            Regex::new(r"^([A-Za-z][A-Za-z&.'\- ]+)$")?,
        ];
        Ok(Self { patterns })
    }

    pub fn extract(&self, description: &str) -> Option<String> {
        let description = description.trim();
        for re in &self.patterns {
            if let Some(caps) = re.captures(description) {
                if let Some(captured) = caps.get(1) {
                    let captured = captured.as_str().trim();
                    if !captured.is_empty() {
                        return Some(captured.to_string());
                    }
                }
            }
        }
        None
    }
}
