//! SHA-256 content addressing for blobs and actions.

use prost::Message;
use sha2::Digest as _;
use sha2::Sha256;

use crate::proto::Digest;

/// Computes and formats content digests. Stateless; the hash function is
/// fixed to SHA-256, the function stock Remote Execution clients default to.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestUtil;

impl DigestUtil {
    pub fn compute(
        &self,
        blob: &[u8],
    ) -> Digest {
        Digest {
            hash: hex::encode(Sha256::digest(blob)),
            size_bytes: blob.len() as i64,
        }
    }

    pub fn compute_message<M: Message>(
        &self,
        message: &M,
    ) -> Digest {
        self.compute(&message.encode_to_vec())
    }

    pub fn empty(&self) -> Digest {
        self.compute(&[])
    }

    pub fn action_key(
        &self,
        action: &crate::proto::Action,
    ) -> ActionKey {
        ActionKey(self.compute_message(action))
    }
}

/// An action digest in its role as action-cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey(Digest);

impl ActionKey {
    pub fn digest(&self) -> &Digest {
        &self.0
    }
}

impl From<Digest> for ActionKey {
    fn from(digest: Digest) -> Self {
        ActionKey(digest)
    }
}
