//! CLI command implementations

pub mod category;
pub mod completions;
pub mod config;
pub mod init;
pub mod mfr;
pub mod part;
pub mod search;
pub mod suggest;
