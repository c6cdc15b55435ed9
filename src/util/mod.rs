//! Shared utilities: color values and content hashing.

pub mod hash;
pub mod rgb;
