//! Shared helpers for file handling and child processes.

pub mod fs;
pub mod process;
