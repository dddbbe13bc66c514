#![allow(clippy::needless_return, clippy::redundant_field_names)]

// interface and kernel are public because otherwise there isn't a great
// way to 'use' them for benchmarking.
pub mod interface;
pub mod kernel;
pub mod tools;

#[cfg(test)]
mod tests;
