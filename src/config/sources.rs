//! Configuration sources, lowest precedence first.

pub mod chest_file;
pub mod environment;
pub mod global_file;
