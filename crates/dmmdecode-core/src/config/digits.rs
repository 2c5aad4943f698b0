use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::fields::layout;

/// Display symbol of a digit-table entry.
///
/// Profiles write digits as JSON numbers and letters as strings
/// (`{"0111110": 5, "1110111": "A"}`); both become text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SymbolRepr", into = "String")]
pub struct DigitSymbol(String);

impl DigitSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DigitSymbol> for String {
    fn from(value: DigitSymbol) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SymbolRepr {
    Integer(i64),
    Text(String),
}

impl From<SymbolRepr> for DigitSymbol {
    fn from(value: SymbolRepr) -> Self {
        match value {
            SymbolRepr::Integer(n) => DigitSymbol(n.to_string()),
            SymbolRepr::Text(text) => DigitSymbol(text),
        }
    }
}

/// Seven-segment pattern to display symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitTable {
    symbols: HashMap<String, String>,
}

impl DigitTable {
    /// Build a table, checking every key is a 7-bit pattern string.
    pub fn new<I, K, V>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut symbols = HashMap::new();
        for (pattern, symbol) in entries {
            let pattern = pattern.into();
            if !is_pattern(&pattern) {
                return Err(ConfigError::InvalidDigitPattern { pattern });
            }
            symbols.insert(pattern, symbol.into());
        }
        Ok(Self { symbols })
    }

    pub fn lookup(&self, pattern: &str) -> Option<&str> {
        self.symbols.get(pattern).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn is_pattern(pattern: &str) -> bool {
    pattern.len() == layout::DIGIT_PATTERN_BITS
        && pattern.chars().all(|bit| bit == '0' || bit == '1')
}
