use alloy::contract::Error as ContractError;
use alloy::sol_types::decode_revert_reason;
use alloy::transports::{RpcError, TransportErrorKind};
use log::debug;

use crate::entity::SwapError;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

pub fn from_contract_error(err: ContractError) -> SwapError {
    match err {
        ContractError::TransportError(e) => from_rpc_error(e),
        other => SwapError::NetworkError(other.to_string()),
    }
}

pub fn from_rpc_error(err: RpcError<TransportErrorKind>) -> SwapError {
    match err.as_error_resp() {
        Some(payload) => {
            let decoded = payload
                .as_revert_data()
                .and_then(|data| decode_revert_reason(&data));
            let data = payload.data.as_ref().map(|raw| raw.get());
            debug!(
                "RPC error response: code={} message={} data={:?}",
                payload.code, payload.message, data
            );
            classify_rpc_failure(payload.code, &payload.message, data, decoded)
        }
        None => SwapError::NetworkError(err.to_string()),
    }
}

/// Map an RPC error response onto the error taxonomy.
///
/// Revert reasons are looked up in order: decoded revert data, the `message`
/// field of the error data object, then the RPC message itself.
pub fn classify_rpc_failure(
    code: i64,
    message: &str,
    data: Option<&str>,
    decoded_revert: Option<String>,
) -> SwapError {
    if code == USER_REJECTED_CODE {
        return SwapError::UserRejected;
    }

    if let Some(reason) = decoded_revert {
        let reason = reason
            .strip_prefix("revert: ")
            .map(str::to_string)
            .unwrap_or(reason);
        return SwapError::TransactionReverted(reason);
    }

    if let Some(reason) = data.and_then(data_message) {
        return SwapError::TransactionReverted(reason);
    }

    if message.to_ascii_lowercase().contains("revert") {
        return SwapError::TransactionReverted(message.to_string());
    }

    SwapError::NetworkError(message.to_string())
}

fn data_message(data: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}
