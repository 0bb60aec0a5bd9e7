
use super::{SwapError, TokenRegistry};
use crate::evm::units;

/// In-memory form fields of one chat, filled in by token selection and amount
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapForm {
    pub from_token: Option<String>,
    pub to_token: Option<String>,
    pub amount: Option<String>,
}

impl SwapForm {
    /// Build an intent from the form, validating it against the registry.
    pub fn intent(&self, tokens: &TokenRegistry) -> Result<SwapIntent, SwapError> {
        match (&self.from_token, &self.to_token, &self.amount) {
            (Some(from), Some(to), Some(amount)) => SwapIntent::new(from, to, amount, tokens),
            _ => Err(SwapError::IncompleteIntent),
        }
    }

    pub fn pair(&self) -> Option<(&str, &str)> {
        match (&self.from_token, &self.to_token) {
            (Some(from), Some(to)) => Some((from.as_str(), to.as_str())),
            _ => None,
        }
    }
}

/// Which end of the swap a token selection fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSide {
    From,
    To,
}

impl TokenSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSide::From => "from",
            TokenSide::To => "to",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "from" => Some(TokenSide::From),
            "to" => Some(TokenSide::To),
            _ => None,
        }
    }

    pub fn apply(&self, form: &mut SwapForm, symbol: &str) {
        let slot = match self {
            TokenSide::From => &mut form.from_token,
            TokenSide::To => &mut form.to_token,
        };
        *slot = Some(symbol.to_string());
    }
}

/// A validated (from, to, amount) request. The amount is still the
/// human-entered string; it is scaled once the from-token decimals are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub from_token: String,
    pub to_token: String,
    pub amount: String,
}

impl SwapIntent {
    pub fn new(
        from_token: &str,
        to_token: &str,
        amount: &str,
        tokens: &TokenRegistry,
    ) -> Result<Self, SwapError> {
        tokens.get(from_token)?;
        tokens.get(to_token)?;

        let amount = units::validate_amount(amount)?;

        Ok(Self {
            from_token: from_token.to_string(),
            to_token: to_token.to_string(),
            amount: amount.to_string(),
        })
    }
}
