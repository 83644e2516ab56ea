//! Command handlers

pub mod config;
pub mod entry;
pub mod pin;
