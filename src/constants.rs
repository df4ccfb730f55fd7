/// Violation subject attached to actions whose timeout exceeds the
/// configured maximum.
pub const TIMEOUT_OUT_OF_BOUNDS: &str =
    "A timeout specified is out of bounds with a configured range";

/// `google.rpc.PreconditionFailure` violation type for invalid arguments.
pub(crate) const VIOLATION_TYPE_INVALID: &str = "INVALID";

// -
// Naming

/// Path segment under which operations are published.
pub(crate) const OPERATIONS_SEGMENT: &str = "operations";

/// Stream name suffixes derived from an operation name.
pub(crate) const STDOUT_STREAM_SUFFIX: &str = "streams/stdout";
pub(crate) const STDERR_STREAM_SUFFIX: &str = "streams/stderr";
