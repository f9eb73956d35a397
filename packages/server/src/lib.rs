//! Kairo message relay.
//!
//! Keeps a bounded window of recent messages and fans every new message out to
//! all attached connections, dropping connections whose delivery fails.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

#[cfg(test)]
pub(crate) mod test_support;
