use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use prost::Message;

use super::operations::OutstandingOperations;
use crate::proto::Operation;
use crate::proto::OperationIteratorToken;
use crate::ExecutionError;
use crate::Result;

/// Encodes a resume cursor naming the last operation yielded.
pub fn encode_operation_token(operation_name: &str) -> String {
    let token = OperationIteratorToken {
        operation_name: operation_name.to_string(),
    };
    STANDARD.encode(token.encode_to_vec())
}

/// Decodes a cursor produced by [`encode_operation_token`]. Malformed input
/// is an invalid-argument error, never a panic.
pub fn decode_operation_token(page_token: &str) -> Result<OperationIteratorToken> {
    let bytes = STANDARD
        .decode(page_token)
        .map_err(|e| ExecutionError::InvalidArgument(format!("malformed page token: {e}")))?;
    OperationIteratorToken::decode(bytes.as_slice())
        .map_err(|e| ExecutionError::InvalidArgument(format!("malformed page token: {e}")).into())
}

/// One page of the in-flight operation set, in key order.
///
/// `page_size == 0` selects the default; any request clamps to the maximum.
/// Iteration resumes strictly after the token's operation name, so entries
/// removed mid-iteration are skipped rather than re-sought. The next-page
/// token is empty once no keys order after the last yielded name.
pub fn list_operations(
    outstanding: &OutstandingOperations,
    page_size: u32,
    page_token: &str,
    default_page_size: u32,
    max_page_size: u32,
) -> Result<(Vec<Operation>, String)> {
    let size = if page_size == 0 {
        default_page_size
    } else {
        page_size.min(max_page_size)
    } as usize;

    let after = if page_token.is_empty() {
        None
    } else {
        Some(decode_operation_token(page_token)?.operation_name)
    };

    let operations = outstanding.page(after.as_deref(), size);
    let next_token = match operations.last() {
        Some(last) if outstanding.has_after(&last.name) => encode_operation_token(&last.name),
        _ => String::new(),
    };
    Ok((operations, next_token))
}
