//! Data models shared across the audit pipeline.

pub mod config;
pub mod document;
