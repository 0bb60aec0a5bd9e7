use alloy::primitives::{Address, U256};
use std::collections::BTreeMap;

use super::SwapError;

/// Decimals assumed when a token does not answer `decimals()`.
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: String,        // Key used in commands (e.g. "GT")
    pub address: Address,      // ERC-20 contract address
    pub default_decimals: u8,  // Used when the contract call fails
}

#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub symbol: String,
    pub raw: U256,
    pub decimals: u8,
    pub formatted: String,
}

/// Static symbol -> token mapping supplied by configuration.
#[derive(Debug, Clone, Default)]
pub struct TokenRegistry {
    tokens: BTreeMap<String, Token>,
}

impl TokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|token| (token.symbol.clone(), token))
                .collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Result<&Token, SwapError> {
        self.tokens
            .get(symbol)
            .ok_or_else(|| SwapError::UnknownToken(symbol.to_string()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.values()
    }
}
