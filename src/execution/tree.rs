use std::collections::VecDeque;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use prost::Message;

use crate::cas::ContentAddressableStorage;
use crate::proto::Digest;
use crate::proto::Directory;
use crate::proto::TreeIteratorToken;
use crate::ExecutionError;
use crate::Result;

fn encode_tree_token(pending: &VecDeque<Digest>) -> String {
    let token = TreeIteratorToken {
        pending: pending.iter().cloned().collect(),
    };
    STANDARD.encode(token.encode_to_vec())
}

fn decode_tree_token(page_token: &str) -> Result<TreeIteratorToken> {
    let bytes = STANDARD
        .decode(page_token)
        .map_err(|e| ExecutionError::InvalidArgument(format!("malformed tree token: {e}")))?;
    TreeIteratorToken::decode(bytes.as_slice())
        .map_err(|e| ExecutionError::InvalidArgument(format!("malformed tree token: {e}")).into())
}

/// One page of the directory tree rooted at `root_digest`, breadth-first.
///
/// The resume token carries the unvisited frontier, so pagination is stable
/// against concurrent CAS churn of already-visited directories. A directory
/// absent from the CAS surfaces as a missing-blob error.
pub async fn get_tree(
    cas: &Arc<dyn ContentAddressableStorage>,
    root_digest: &Digest,
    page_size: u32,
    page_token: &str,
    default_page_size: u32,
    max_page_size: u32,
) -> Result<(Vec<Directory>, String)> {
    let size = if page_size == 0 {
        default_page_size
    } else {
        page_size.min(max_page_size)
    } as usize;

    let mut pending: VecDeque<Digest> = if page_token.is_empty() {
        VecDeque::from([root_digest.clone()])
    } else {
        decode_tree_token(page_token)?.pending.into()
    };

    let mut directories = Vec::new();
    while directories.len() < size {
        let Some(digest) = pending.pop_front() else {
            break;
        };
        let Some(bytes) = cas.get(&digest).await? else {
            return Err(ExecutionError::MissingBlob(digest).into());
        };
        let directory = Directory::decode(bytes.as_ref())?;
        for child in &directory.directories {
            if let Some(child_digest) = &child.digest {
                pending.push_back(child_digest.clone());
            }
        }
        directories.push(directory);
    }

    let next_token = if pending.is_empty() {
        String::new()
    } else {
        encode_tree_token(&pending)
    };
    Ok((directories, next_token))
}
