//! Client configuration.

use serde::Deserialize;

/// Public endpoint of the corporate-number Web-API.
pub const DEFAULT_BASE_URL: &str = "https://api.houjin-bangou.nta.go.jp";

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "4";

/// Wire key that entity-kind codes are written under.
///
/// The first published client wrote the kind code into the `address`
/// parameter, replacing any location code that was set. `Address` keeps
/// that behavior for callers that depend on it; `Kind` sends `kind=` as the
/// registry documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindParameter {
    #[default]
    Kind,
    Address,
}

impl KindParameter {
    pub fn wire_key(self) -> &'static str {
        match self {
            KindParameter::Kind => "kind",
            KindParameter::Address => "address",
        }
    }
}

/// Immutable settings for a `QueryClient`.
///
/// Every field has a default, so a host can deserialize this from a partial
/// section of its own config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub version: String,
    pub base_url: Option<String>,
    pub kind_parameter: KindParameter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_API_VERSION.to_string(),
            base_url: None,
            kind_parameter: KindParameter::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_kind_parameter(mut self, kind_parameter: KindParameter) -> Self {
        self.kind_parameter = kind_parameter;
        self
    }

    /// Base URL in effect: the override if set, else the public endpoint.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}
