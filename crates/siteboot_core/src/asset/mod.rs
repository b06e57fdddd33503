//! Asset search paths and `require` expansion.

pub mod directive;
pub mod pipeline;
