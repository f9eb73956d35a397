//! Utilities shared by the Kairo packages: logging setup and time helpers.

pub mod logger;
pub mod time;
