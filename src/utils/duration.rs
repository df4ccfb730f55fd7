//! Helpers over `google.protobuf.Duration` values.
//!
//! The wire type is a plain `(seconds, nanos)` pair with no ordering or
//! arithmetic, so the scheduler carries its own comparison and conversion.

use std::cmp::Ordering;
use std::time::Duration;

use prost_types::Duration as ProtoDuration;

pub(crate) const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Lexicographic `(seconds, nanos)` comparison.
pub fn duration_cmp(
    a: &ProtoDuration,
    b: &ProtoDuration,
) -> Ordering {
    a.seconds.cmp(&b.seconds).then(a.nanos.cmp(&b.nanos))
}

/// Component-wise sum, carrying nanosecond overflow into seconds.
pub fn duration_add(
    a: &ProtoDuration,
    b: &ProtoDuration,
) -> ProtoDuration {
    let mut seconds = a.seconds + b.seconds;
    let mut nanos = a.nanos + b.nanos;
    if nanos >= NANOS_PER_SECOND {
        seconds += 1;
        nanos -= NANOS_PER_SECOND;
    }
    ProtoDuration { seconds, nanos }
}

pub fn duration_from_millis(ms: u64) -> ProtoDuration {
    ProtoDuration {
        seconds: (ms / 1000) as i64,
        nanos: ((ms % 1000) * 1_000_000) as i32,
    }
}

/// Saturating conversion to a std `Duration` for timer arming. Negative
/// components clamp to zero.
pub fn duration_to_std(d: &ProtoDuration) -> Duration {
    let seconds = d.seconds.max(0) as u64;
    let nanos = d.nanos.max(0) as u32;
    Duration::new(seconds, nanos)
}

/// `3.5s`-style rendering used in violation descriptions.
pub fn duration_format(d: &ProtoDuration) -> String {
    if d.nanos == 0 {
        format!("{}s", d.seconds)
    } else {
        let fractional = format!("{:09}", d.nanos.unsigned_abs());
        format!("{}.{}s", d.seconds, fractional.trim_end_matches('0'))
    }
}
