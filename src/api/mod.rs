//! Helix REST API.

pub mod client;
pub mod streams;

pub use client::{HelixClient, Pagination, ResponseData};
pub use streams::Stream;
