//! palaver-http: async HTTP client for the palaver model adapters
//!
//! A thin layer over `reqwest` shared by every remote adapter in the
//! workspace. Provides connection pooling, a configured base address,
//! latency measurement, and cancellation-aware requests.
//!
//! # Architecture
//!
//! - `HttpClient`: connection-pooled async client, cheap to clone
//! - `HttpClientConfig`: builder-style configuration (base URL, user
//!   agent, timeouts)
//! - `HttpResponse`: response wrapper with raw body and latency

pub mod client;
pub mod config;
pub mod error;
pub mod response;

pub use client::HttpClient;
pub use config::HttpClientConfig;
pub use error::{HttpError, HttpResult};
pub use response::HttpResponse;
