//! Blocking client for the ClickHouse Cloud service-management API.
//!
//! # Overview
//! Fetches service details, updates scaling and starts/stops services. Every
//! request is authenticated with the API key pair as HTTP Basic credentials,
//! and every response is decoded into the `ApiResponse<T>` envelope.
//!
//! # Design
//! - `CloudClient` is immutable after construction; it holds credentials, the
//!   base URL and a `Transport`, and can be shared across threads.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit and callers may run
//!   the round trip on their own HTTP stack.
//! - The one-call methods perform exactly one round trip through the
//!   transport. There are no retries, timeouts or caches beyond what the
//!   transport itself provides.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use auth::basic_auth;
pub use client::{parse_response, CloudClient, DEFAULT_BASE_URL};
pub use error::{ApiError, ConfigError};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{
    ApiResponse, IpAccessEntry, ServiceCommand, ServiceDetails, ServiceEndpoint, ServiceScaling,
    ServiceStateCommand,
};
