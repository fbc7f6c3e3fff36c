//! Wire-parameter rules for each endpoint.
//!
//! # Design
//! Every parameter an endpoint sends is one row in a static rule table:
//! the wire key, whether it is required, defaulted or optional, how its
//! value is coerced, and how to read it from the query. `render` walks a
//! table and produces the parameter list, so the three endpoints share one
//! pipeline and differ only in their tables.
//!
//! Rows are applied with "set" semantics: a key written twice keeps its
//! first position and its last value. That matters for the entity-kind row
//! under `KindParameter::Address`, which replaces the location code.

use std::sync::OnceLock;

use chrono::NaiveDate;

use crate::config::KindParameter;
use crate::query::{CorporateNumbers, DateInput, DiffQuery, NameQuery, NumberQuery, ResponseType, Scalar};

const ISO_DATE: &str = "%Y-%m-%d";

/// Endpoint path segment under `/{version}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Num,
    Diff,
    Name,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Num => "num",
            Endpoint::Diff => "diff",
            Endpoint::Name => "name",
        }
    }
}

/// A field value before coercion.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Input<'a> {
    Text(&'a str),
    Number(i64),
    Date(NaiveDate),
    List(&'a [String]),
}

impl<'a> From<&'a Scalar> for Input<'a> {
    fn from(value: &'a Scalar) -> Self {
        match value {
            Scalar::Number(n) => Input::Number(*n),
            Scalar::Text(s) => Input::Text(s),
        }
    }
}

impl<'a> From<&'a DateInput> for Input<'a> {
    fn from(value: &'a DateInput) -> Self {
        match value {
            DateInput::Date(d) => Input::Date(*d),
            DateInput::Text(s) => Input::Text(s),
        }
    }
}

impl<'a> From<&'a CorporateNumbers> for Input<'a> {
    fn from(value: &'a CorporateNumbers) -> Self {
        match value {
            CorporateNumbers::One(s) => Input::Text(s),
            CorporateNumbers::Many(items) => Input::List(items),
        }
    }
}

/// How a value is turned into wire text. Text always passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Coercion {
    Verbatim,
    /// Numbers become two-digit zero-padded codes.
    ZeroPad2,
    /// Dates become `YYYY-MM-DD`.
    IsoDate,
    /// Lists are joined with `,`.
    CommaJoin,
}

impl Coercion {
    pub(crate) fn apply(self, input: Input<'_>) -> String {
        match (self, input) {
            (_, Input::Text(s)) => s.to_string(),
            (Coercion::ZeroPad2, Input::Number(n)) => format!("{n:02}"),
            (_, Input::Number(n)) => n.to_string(),
            (_, Input::Date(d)) => d.format(ISO_DATE).to_string(),
            (_, Input::List(items)) => items.join(","),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    Required,
    /// Sent only when the query has a value.
    Optional,
    /// Sent with this value when the query has none.
    Default(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WireKey {
    Fixed(&'static str),
    /// Resolved through `KindParameter`.
    EntityKind,
}

impl WireKey {
    fn resolve(self, kind: KindParameter) -> &'static str {
        match self {
            WireKey::Fixed(key) => key,
            WireKey::EntityKind => kind.wire_key(),
        }
    }
}

pub(crate) struct FieldRule<Q> {
    pub key: WireKey,
    pub presence: Presence,
    pub coercion: Coercion,
    pub value: fn(&Q) -> Option<Input<'_>>,
}

/// Ordered wire parameters with set semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub(crate) fn set(&mut self, key: &'static str, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

pub(crate) fn render<Q>(rules: &[FieldRule<Q>], query: &Q, kind: KindParameter) -> QueryParams {
    let mut params = QueryParams::default();
    for rule in rules {
        let value = match ((rule.value)(query), rule.presence) {
            (Some(input), _) => rule.coercion.apply(input),
            (None, Presence::Default(fallback)) => fallback.to_string(),
            (None, Presence::Required) => String::new(),
            (None, Presence::Optional) => continue,
        };
        params.set(rule.key.resolve(kind), value);
    }
    params
}

/// A query type bound to its endpoint and rule table.
pub(crate) trait RegistryQuery: Sized + 'static {
    const ENDPOINT: Endpoint;

    fn rules() -> &'static [FieldRule<Self>];
}

fn xml_type<Q>(_: &Q) -> Option<Input<'_>> {
    Some(Input::Text(ResponseType::XmlUnicode.code()))
}

fn type_rule<Q>() -> FieldRule<Q> {
    FieldRule {
        key: WireKey::Fixed("type"),
        presence: Presence::Required,
        coercion: Coercion::Verbatim,
        value: xml_type::<Q>,
    }
}

fn kind_rule<Q>(value: fn(&Q) -> Option<Input<'_>>) -> FieldRule<Q> {
    FieldRule {
        key: WireKey::EntityKind,
        presence: Presence::Optional,
        coercion: Coercion::ZeroPad2,
        value,
    }
}

fn optional<Q>(key: &'static str, coercion: Coercion, value: fn(&Q) -> Option<Input<'_>>) -> FieldRule<Q> {
    FieldRule {
        key: WireKey::Fixed(key),
        presence: Presence::Optional,
        coercion,
        value,
    }
}

fn required<Q>(key: &'static str, coercion: Coercion, value: fn(&Q) -> Option<Input<'_>>) -> FieldRule<Q> {
    FieldRule {
        key: WireKey::Fixed(key),
        presence: Presence::Required,
        coercion,
        value,
    }
}

impl RegistryQuery for NumberQuery {
    const ENDPOINT: Endpoint = Endpoint::Num;

    fn rules() -> &'static [FieldRule<Self>] {
        static RULES: OnceLock<Vec<FieldRule<NumberQuery>>> = OnceLock::new();
        RULES.get_or_init(|| {
            vec![
                required("number", Coercion::CommaJoin, |q: &NumberQuery| Some(Input::from(&q.number))),
                type_rule(),
                FieldRule {
                    key: WireKey::Fixed("history"),
                    presence: Presence::Default("0"),
                    coercion: Coercion::Verbatim,
                    value: |q: &NumberQuery| q.history.as_ref().map(Input::from),
                },
            ]
        })
    }
}

impl RegistryQuery for DiffQuery {
    const ENDPOINT: Endpoint = Endpoint::Diff;

    fn rules() -> &'static [FieldRule<Self>] {
        static RULES: OnceLock<Vec<FieldRule<DiffQuery>>> = OnceLock::new();
        RULES.get_or_init(|| {
            vec![
                required("from", Coercion::IsoDate, |q: &DiffQuery| Some(Input::from(&q.from))),
                required("to", Coercion::IsoDate, |q: &DiffQuery| Some(Input::from(&q.to))),
                type_rule(),
                optional("address", Coercion::Verbatim, |q: &DiffQuery| q.address.as_ref().map(Input::from)),
                optional("divide", Coercion::Verbatim, |q: &DiffQuery| q.divide.as_ref().map(Input::from)),
                kind_rule(|q: &DiffQuery| q.kind.as_ref().map(Input::from)),
            ]
        })
    }
}

impl RegistryQuery for NameQuery {
    const ENDPOINT: Endpoint = Endpoint::Name;

    fn rules() -> &'static [FieldRule<Self>] {
        static RULES: OnceLock<Vec<FieldRule<NameQuery>>> = OnceLock::new();
        RULES.get_or_init(|| {
            vec![
                type_rule(),
                required("name", Coercion::Verbatim, |q: &NameQuery| Some(Input::Text(&q.name))),
                optional("mode", Coercion::Verbatim, |q: &NameQuery| q.mode.map(|m| Input::Text(m.code()))),
                optional("target", Coercion::Verbatim, |q: &NameQuery| q.target.map(|t| Input::Text(t.code()))),
                optional("address", Coercion::Verbatim, |q: &NameQuery| q.address.as_ref().map(Input::from)),
                kind_rule(|q: &NameQuery| q.kind.as_ref().map(Input::from)),
                optional("change", Coercion::Verbatim, |q: &NameQuery| q.change.as_ref().map(Input::from)),
                optional("close", Coercion::Verbatim, |q: &NameQuery| q.close.as_ref().map(Input::from)),
                optional("from", Coercion::IsoDate, |q: &NameQuery| q.from.as_ref().map(Input::from)),
                optional("to", Coercion::IsoDate, |q: &NameQuery| q.to.as_ref().map(Input::from)),
                optional("divide", Coercion::Verbatim, |q: &NameQuery| q.divide.as_ref().map(Input::from)),
            ]
        })
    }
}
