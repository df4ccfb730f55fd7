#[doc(hidden)]
pub mod duration;

pub use duration::*;
