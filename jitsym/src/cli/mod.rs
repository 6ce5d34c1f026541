//! Command-line interface

pub mod args;

pub use args::{parse_address, Args};
