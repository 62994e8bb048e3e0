//! The candidate space: an ascending, zero-padded range of numeric codes
mod range;

pub use self::range::{CodeRange, DEFAULT_END, DEFAULT_START, DEFAULT_WIDTH};
