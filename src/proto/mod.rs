//! Wire-model types for the Remote Execution API subset the scheduler
//! speaks.
//!
//! The messages are written out with [`prost`] derives rather than generated
//! from `.proto` files; field numbers follow
//! `build.bazel.remote.execution.v2`, `google.longrunning` and `google.rpc`
//! so encoded blobs interoperate with stock clients and workers.

use prost::Message;

/// A content digest: lowercase hex SHA-256 plus the blob size.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Digest {
    #[prost(string, tag = "1")]
    pub hash: String,
    #[prost(int64, tag = "2")]
    pub size_bytes: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Property {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// A multiset of `(name, value)` capability properties.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Platform {
    #[prost(message, repeated, tag = "1")]
    pub properties: Vec<Property>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Command {
    #[prost(string, repeated, tag = "1")]
    pub arguments: Vec<String>,
    #[prost(message, optional, tag = "5")]
    pub platform: Option<Platform>,
}

/// Content-addressed unit of work. Immutable once stored.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Action {
    #[prost(message, optional, tag = "1")]
    pub command_digest: Option<Digest>,
    #[prost(message, optional, tag = "2")]
    pub input_root_digest: Option<Digest>,
    #[prost(message, optional, tag = "6")]
    pub timeout: Option<::prost_types::Duration>,
    #[prost(bool, tag = "7")]
    pub do_not_cache: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileNode {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub digest: Option<Digest>,
    #[prost(bool, tag = "4")]
    pub is_executable: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DirectoryNode {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub digest: Option<Digest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Directory {
    #[prost(message, repeated, tag = "1")]
    pub files: Vec<FileNode>,
    #[prost(message, repeated, tag = "2")]
    pub directories: Vec<DirectoryNode>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionResult {
    #[prost(int32, tag = "4")]
    pub exit_code: i32,
    #[prost(message, optional, tag = "6")]
    pub stdout_digest: Option<Digest>,
    #[prost(message, optional, tag = "8")]
    pub stderr_digest: Option<Digest>,
}

/// Terminal payload packed into a completed operation's `response`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteResponse {
    #[prost(message, optional, tag = "1")]
    pub result: Option<ActionResult>,
    #[prost(bool, tag = "2")]
    pub cached_result: bool,
    #[prost(message, optional, tag = "3")]
    pub status: Option<Status>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ExecutionStage {
    Unknown = 0,
    CacheCheck = 1,
    Queued = 2,
    Executing = 3,
    Completed = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExecuteOperationMetadata {
    #[prost(enumeration = "ExecutionStage", tag = "1")]
    pub stage: i32,
    #[prost(message, optional, tag = "2")]
    pub action_digest: Option<Digest>,
    #[prost(string, tag = "3")]
    pub stdout_stream_name: String,
    #[prost(string, tag = "4")]
    pub stderr_stream_name: String,
}

/// `google.rpc.Status`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, repeated, tag = "3")]
    pub details: Vec<::prost_types::Any>,
}

/// Canonical `google.rpc.Code` values the scheduler emits.
pub mod code {
    pub const OK: i32 = 0;
    pub const INVALID_ARGUMENT: i32 = 3;
    pub const DEADLINE_EXCEEDED: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const FAILED_PRECONDITION: i32 = 9;
}

/// `google.longrunning.Operation`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Operation {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub metadata: Option<::prost_types::Any>,
    #[prost(bool, tag = "3")]
    pub done: bool,
    #[prost(oneof = "operation::Result", tags = "4, 5")]
    pub result: Option<operation::Result>,
}

pub mod operation {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Result {
        #[prost(message, tag = "4")]
        Error(super::Status),
        #[prost(message, tag = "5")]
        Response(::prost_types::Any),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PreconditionFailure {
    #[prost(message, repeated, tag = "1")]
    pub violations: Vec<precondition_failure::Violation>,
}

pub mod precondition_failure {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Violation {
        #[prost(string, tag = "1")]
        pub r#type: String,
        #[prost(string, tag = "2")]
        pub subject: String,
        #[prost(string, tag = "3")]
        pub description: String,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetActionResultRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, optional, tag = "2")]
    pub action_digest: Option<Digest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateActionResultRequest {
    #[prost(string, tag = "1")]
    pub instance_name: String,
    #[prost(message, optional, tag = "2")]
    pub action_digest: Option<Digest>,
    #[prost(message, optional, tag = "3")]
    pub action_result: Option<ActionResult>,
}

/// Resume cursor for `list_operations`: the last name yielded.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OperationIteratorToken {
    #[prost(string, tag = "1")]
    pub operation_name: String,
}

/// Resume cursor for `get_tree`: the unvisited directory frontier.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TreeIteratorToken {
    #[prost(message, repeated, tag = "1")]
    pub pending: Vec<Digest>,
}

pub const EXECUTE_OPERATION_METADATA_TYPE_URL: &str =
    "type.googleapis.com/build.bazel.remote.execution.v2.ExecuteOperationMetadata";
pub const EXECUTE_RESPONSE_TYPE_URL: &str =
    "type.googleapis.com/build.bazel.remote.execution.v2.ExecuteResponse";
pub const PRECONDITION_FAILURE_TYPE_URL: &str =
    "type.googleapis.com/google.rpc.PreconditionFailure";

/// Packs a message into an `Any` under the given type URL.
pub fn pack_any<M: Message>(
    type_url: &str,
    message: &M,
) -> ::prost_types::Any {
    ::prost_types::Any {
        type_url: type_url.to_string(),
        value: message.encode_to_vec(),
    }
}

/// Decodes an `Any` payload, ignoring the type URL. Callers pick the target
/// type from context (operation metadata vs. response).
pub fn unpack_any<M: Message + Default>(any: &::prost_types::Any) -> Result<M, prost::DecodeError> {
    M::decode(any.value.as_slice())
}
