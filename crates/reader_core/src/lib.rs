//! Reader API access: filter validation, typed records and the HTTP client

pub mod client;
pub mod format;
pub mod models;
pub mod query;

pub use client::{ReaderApi, ReaderClient};
pub use models::{DocumentRecord, ListResponse, UNTITLED};
pub use query::{ListQuery, Location};
