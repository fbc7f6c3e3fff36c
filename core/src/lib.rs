//! Async client for the corporate-number registry Web-API.
//!
//! # Overview
//! `QueryClient` turns typed queries for the three lookup endpoints
//! (`/num`, `/diff`, `/name`) into request URLs, sends them, and converts
//! the XML answer into a structured result.
//!
//! # Design
//! - Request building and response parsing are separate, I/O-free steps
//!   (`build_*`, `parse_response`); the async operations compose them with
//!   an `HttpTransport`.
//! - Wire parameters come from one static rule table per endpoint
//!   (`params`), including the forced `type=12`.
//! - XML handling sits behind `DocumentParser` so the client can be tested
//!   against canned documents.
//!
//! ```no_run
//! use houjin_core::{ClientConfig, NumberQuery, QueryClient};
//!
//! # async fn run() -> Result<(), houjin_core::ApiError> {
//! let client = QueryClient::new("my-application-id", ClientConfig::default())?;
//! let data = client.num(&NumberQuery::new("7000012050002")).await?;
//! for record in data.corporations.records() {
//!     println!("{} {}", record.corporate_number, record.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod query;
pub mod types;
pub mod xml;

pub use client::QueryClient;
pub use config::{ClientConfig, KindParameter, DEFAULT_API_VERSION, DEFAULT_BASE_URL};
pub use error::{ApiError, TransportError};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use params::Endpoint;
pub use query::{
    CorporateNumbers, DateInput, DiffQuery, MatchMode, MatchTarget, NameQuery, NumberQuery, ResponseType, Scalar,
};
pub use types::{Corporation, Corporations, OneOrMany, ResponseData};
pub use xml::{DocumentParser, QuickXmlParser};
