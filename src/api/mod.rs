//! Request and response shapes for an external HTTP transport.
//!
//! The transport itself lives outside this crate behind the [`HttpClient`]
//! trait; only the shapes cross the boundary. Transport-layer failures are
//! normalized into the [`ApiError`] taxonomy before they reach feature code,
//! so use cases only ever see typed errors.

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientExt};
pub use request::{ApiRequest, ApiRequestBuilder, Method, Route};
pub use response::{zip2, zip3, ApiError, ApiResponse};
