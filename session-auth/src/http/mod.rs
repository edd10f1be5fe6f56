//! HTTP client building and backend response handling.

mod client;
mod response;

pub use client::{ClientBuilder, HttpClientConfig};
pub(crate) use response::read_body;
