//! Request builder, response parser and async operations for the registry.
//!
//! # Design
//! `QueryClient` holds its application id, an immutable `ClientConfig` and
//! two shared collaborators: an `HttpTransport` and a `DocumentParser`.
//! Each lookup is split into a `build_*` method that produces an
//! `HttpRequest` and the shared `parse_response` that consumes the
//! `HttpResponse`. The async `num` / `diff` / `name` methods run
//! build → transport → parse through one generic pipeline. Hosts that do
//! their own I/O can call the two halves directly.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::params::{render, Endpoint, RegistryQuery};
use crate::query::{DiffQuery, NameQuery, NumberQuery};
use crate::types::ResponseData;
use crate::xml::{DocumentParser, QuickXmlParser};

/// Client for the corporate-number Web-API.
///
/// Cheap to clone; clones share the transport and parser. No state changes
/// after construction, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct QueryClient {
    id: String,
    config: ClientConfig,
    base: Url,
    transport: Arc<dyn HttpTransport>,
    parser: Arc<dyn DocumentParser>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.config)
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    pub fn new(id: impl Into<String>, config: ClientConfig) -> Result<Self, ApiError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ApiError::EmptyApplicationId);
        }
        let base = Url::parse(config.base_url())?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        Ok(Self {
            id,
            config,
            base,
            transport: Arc::new(ReqwestTransport::new()),
            parser: Arc::new(QuickXmlParser),
        })
    }

    pub fn with_transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `base` with its path replaced by `/{version}/{endpoint}` and `id` set.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("/{}/{}", self.config.version, endpoint.path()));
        url.set_query(None);
        url.query_pairs_mut().append_pair("id", &self.id);
        url
    }

    pub fn build_num(&self, query: &NumberQuery) -> HttpRequest {
        self.build(query)
    }

    pub fn build_diff(&self, query: &DiffQuery) -> HttpRequest {
        self.build(query)
    }

    pub fn build_name(&self, query: &NameQuery) -> HttpRequest {
        self.build(query)
    }

    /// Lookup by one or more corporate numbers.
    pub async fn num(&self, query: &NumberQuery) -> Result<ResponseData, ApiError> {
        self.execute(query).await
    }

    /// Records updated between two dates.
    pub async fn diff(&self, query: &DiffQuery) -> Result<ResponseData, ApiError> {
        self.execute(query).await
    }

    /// Search by name.
    pub async fn name(&self, query: &NameQuery) -> Result<ResponseData, ApiError> {
        self.execute(query).await
    }

    /// Parse a response body into the typed view.
    ///
    /// The status code is not checked: the registry reports failures as a
    /// non-XML body, which surfaces as `InvalidResponseBody`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ResponseData, ApiError> {
        let document = self.parse_document(&response.body)?;
        serde_json::from_value(document).map_err(|source| ApiError::UnexpectedSchema {
            source,
            body: response.body,
        })
    }

    /// Validate `body` and return its structural conversion.
    pub fn parse_document(&self, body: &str) -> Result<Value, ApiError> {
        let rejected = |reason: String| {
            warn!(%reason, bytes = body.len(), "rejected response body");
            ApiError::InvalidResponseBody {
                body: body.to_string(),
                reason,
            }
        };
        self.parser.validate(body).map_err(rejected)?;
        self.parser.convert(body).map_err(rejected)
    }

    fn build<Q: RegistryQuery>(&self, query: &Q) -> HttpRequest {
        let mut url = self.endpoint_url(Q::ENDPOINT);
        let params = render(Q::rules(), query, self.config.kind_parameter);
        url.query_pairs_mut().extend_pairs(params.iter());
        HttpRequest {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    async fn execute<Q: RegistryQuery>(&self, query: &Q) -> Result<ResponseData, ApiError> {
        let request = self.build(query);
        debug!(endpoint = Q::ENDPOINT.path(), url = %request.url, "sending registry request");

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(ApiError::Transport)?;
        debug!(status = response.status, bytes = response.body.len(), "received registry response");

        self.parse_response(response)
    }
}
