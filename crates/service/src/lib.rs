//! Service layer for the record API.
//! - `records`: create/update/retrieve/delete rules over an injected key-value store.
//! - `helpers`: math and digest helpers served alongside it.
//! - Keeps business rules free of HTTP concerns; the server crate maps errors to responses.

pub mod errors;
pub mod helpers;
pub mod records;
