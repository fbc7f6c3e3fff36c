//! Typed query inputs for the three lookup endpoints.
//!
//! # Design
//! The registry accepts loosely typed values ("a number or a list of
//! numbers", "a date or a preformatted string"). Each such field is a small
//! tagged union here so the shape is settled at the boundary, and the wire
//! rendering lives in one place (`params`).
//!
//! All query types derive `Deserialize` so vectors and host configs can
//! describe queries as JSON using the registry's own parameter names.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer};

/// One corporate number, or several to be sent comma-joined.
///
/// The registry accepts at most ten numbers per request; the client does
/// not enforce that.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CorporateNumbers {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for CorporateNumbers {
    fn from(value: &str) -> Self {
        CorporateNumbers::One(value.to_string())
    }
}

impl From<String> for CorporateNumbers {
    fn from(value: String) -> Self {
        CorporateNumbers::One(value)
    }
}

impl From<Vec<String>> for CorporateNumbers {
    fn from(value: Vec<String>) -> Self {
        CorporateNumbers::Many(value)
    }
}

impl From<&[&str]> for CorporateNumbers {
    fn from(value: &[&str]) -> Self {
        CorporateNumbers::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CorporateNumbers {
    fn from(value: [&str; N]) -> Self {
        CorporateNumbers::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

/// A date value, or text that is sent as-is.
///
/// Deserialized strings always stay `Text`, even when they look like a
/// date: the wire value must be exactly what the caller wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    Text(String),
}

impl<'de> Deserialize<'de> for DateInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(DateInput::Text)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(value: DateTime<Tz>) -> Self {
        DateInput::Date(value.date_naive())
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

/// A code or flag given either as a number or as text.
///
/// `bool` converts to `0`/`1`, which is how the registry spells flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Flag(bool),
            Number(i64),
            Text(String),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Flag(flag) => Scalar::from(flag),
            Wire::Number(n) => Scalar::Number(n),
            Wire::Text(s) => Scalar::Text(s),
        })
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<u8> for Scalar {
    fn from(value: u8) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Number(i64::from(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// Response file format and character set.
///
/// Callers may name one, but the client always requests `XmlUnicode`
/// because that is the only format it can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ResponseType {
    /// CSV, Shift-JIS (JIS levels 1 and 2).
    #[serde(rename = "01")]
    CsvShiftJis,
    /// CSV, Unicode (JIS levels 1 to 4).
    #[serde(rename = "02")]
    CsvUnicode,
    /// XML, Unicode (JIS levels 1 to 4).
    #[serde(rename = "12")]
    XmlUnicode,
}

impl ResponseType {
    pub fn code(self) -> &'static str {
        match self {
            ResponseType::CsvShiftJis => "01",
            ResponseType::CsvUnicode => "02",
            ResponseType::XmlUnicode => "12",
        }
    }
}

/// Name search strategy. The registry defaults to `Prefix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MatchMode {
    #[serde(rename = "1")]
    Prefix,
    #[serde(rename = "2")]
    Partial,
}

impl MatchMode {
    pub fn code(self) -> &'static str {
        match self {
            MatchMode::Prefix => "1",
            MatchMode::Partial => "2",
        }
    }
}

/// Which name representation a search runs against. The registry defaults
/// to `Fuzzy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MatchTarget {
    /// JIS levels 1 and 2, fuzzy matching.
    #[serde(rename = "1")]
    Fuzzy,
    /// JIS levels 1 to 4, exact matching.
    #[serde(rename = "2")]
    Exact,
    /// Registered English names.
    #[serde(rename = "3")]
    English,
}

impl MatchTarget {
    pub fn code(self) -> &'static str {
        match self {
            MatchTarget::Fuzzy => "1",
            MatchTarget::Exact => "2",
            MatchTarget::English => "3",
        }
    }
}

/// Lookup by corporate number (`/num`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NumberQuery {
    pub number: CorporateNumbers,
    #[serde(rename = "type")]
    pub response_type: Option<ResponseType>,
    /// Include change history. Sent as `0` when absent.
    pub history: Option<Scalar>,
}

impl NumberQuery {
    pub fn new(number: impl Into<CorporateNumbers>) -> Self {
        Self {
            number: number.into(),
            response_type: None,
            history: None,
        }
    }

    pub fn with_history(mut self, history: impl Into<Scalar>) -> Self {
        self.history = Some(history.into());
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }
}

/// Records updated within a date range (`/diff`).
///
/// The registry rejects start dates before 2015-12-01 and ranges longer
/// than 50 days.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiffQuery {
    pub from: DateInput,
    pub to: DateInput,
    #[serde(rename = "type")]
    pub response_type: Option<ResponseType>,
    /// Prefecture code, or prefecture plus city code.
    pub address: Option<Scalar>,
    /// Entity-kind code; numbers are zero-padded to two digits.
    pub kind: Option<Scalar>,
    /// Partition number, 1 when absent.
    pub divide: Option<Scalar>,
}

impl DiffQuery {
    pub fn new(from: impl Into<DateInput>, to: impl Into<DateInput>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            response_type: None,
            address: None,
            kind: None,
            divide: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<Scalar>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<Scalar>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_divide(mut self, divide: impl Into<Scalar>) -> Self {
        self.divide = Some(divide.into());
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }
}

/// Search by name (`/name`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameQuery {
    pub name: String,
    #[serde(rename = "type")]
    pub response_type: Option<ResponseType>,
    pub mode: Option<MatchMode>,
    pub target: Option<MatchTarget>,
    pub address: Option<Scalar>,
    pub kind: Option<Scalar>,
    /// Include past names and addresses.
    pub change: Option<Scalar>,
    /// Include closed registrations.
    pub close: Option<Scalar>,
    /// Earliest number-assignment date.
    pub from: Option<DateInput>,
    /// Latest number-assignment date.
    pub to: Option<DateInput>,
    pub divide: Option<Scalar>,
}

impl NameQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            response_type: None,
            mode: None,
            target: None,
            address: None,
            kind: None,
            change: None,
            close: None,
            from: None,
            to: None,
            divide: None,
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_target(mut self, target: MatchTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_address(mut self, address: impl Into<Scalar>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<Scalar>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_change(mut self, change: impl Into<Scalar>) -> Self {
        self.change = Some(change.into());
        self
    }

    pub fn with_close(mut self, close: impl Into<Scalar>) -> Self {
        self.close = Some(close.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<DateInput>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<DateInput>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_divide(mut self, divide: impl Into<Scalar>) -> Self {
        self.divide = Some(divide.into());
        self
    }

    pub fn with_response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }
}
