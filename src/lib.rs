//! Cross-release comparison of transcription factor binding profile
//! matrices, with per-release sequence-logo history reports

pub mod compare;
pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod logo;
pub mod report;
pub mod source;
pub mod types;
