use alloy::primitives::Address;

// Arguments after the command word, e.g. "/approve GT 10" -> ["GT", "10"]
pub fn command_args(text: &str) -> Vec<&str> {
    text.split_whitespace().skip(1).collect()
}

// Token symbols are configured upper-case
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

// Shorten address for display
pub fn shorten_address(address: &Address) -> String {
    let address = address.to_checksum(None);
    let start = &address[..6];
    let end = &address[address.len() - 4..];

    format!("{}...{}", start, end)
}
