use alloy::primitives::U256;

use crate::evm::units;

/// Scaled rate for an ordered token pair, as stored by the swap contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub raw: U256,
}

impl ExchangeRate {
    pub fn new(from: impl Into<String>, to: impl Into<String>, raw: U256) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            raw,
        }
    }

    /// A zero rate means the pair has not been configured on the contract.
    pub fn is_set(&self) -> bool {
        !self.raw.is_zero()
    }

    pub fn display(&self) -> String {
        units::format_rate(self.raw)
    }
}

impl std::fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "1 {} = {} {}", self.from, self.display(), self.to)
    }
}
