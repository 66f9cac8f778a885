//! PLM: parts lifecycle toolkit
//!
//! Structured part numbers, a small search language, duplicate screening and
//! revision/variant tracking for engineering parts stored as plain text
//! files.

pub mod cli;
pub mod core;
pub mod entities;
