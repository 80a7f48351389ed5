//! Shared building blocks for the record service crates.
//!
//! - `types`: response shapes shared by every HTTP surface.
//! - `notify`: outbound notification client (Slack incoming webhooks).
//! - `utils::logging`: tracing subscriber setup.

pub mod notify;
pub mod types;
pub mod utils;
