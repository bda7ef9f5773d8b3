//! cninfo (巨潮资讯) announcement registry module
//!
//! Wire types, the transport trait with its reqwest implementation, and the
//! pagination driver used to collect query results.

pub mod types;
pub mod client;
pub mod errors;
pub mod paginator;

pub use types::*;
pub use errors::CninfoError;
pub use client::{CninfoClient, DisclosureSource};
pub use paginator::fetch_all;
