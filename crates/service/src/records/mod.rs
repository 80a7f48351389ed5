//! Record module: domain, store seam, store implementations, and the CRUD service.
//!
//! The service never keeps records itself; every command goes to a `RecordStore`.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod service;
pub mod store;

pub use errors::RecordError;
pub use service::RecordService;
pub use store::{RecordStore, StoreError};
