//! Pattern-matched text helpers for pasted deal notes. No model calls.

pub mod compose;
pub mod extract;
pub mod handlers;
