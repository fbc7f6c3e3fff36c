//! Typed view of registry responses.
//!
//! # Design
//! These types mirror the XML schema as produced by the structural
//! conversion in `xml`, so they deserialize straight from the converted
//! `serde_json::Value`. Every leaf is a `String`: codes are zero-padded and
//! dates are `YYYY-MM-DD`, and both must round-trip unchanged. Missing
//! elements default to `""` so records from older API versions still load.
//!
//! An empty element (`<corporations/>`, `<corporation/>`) converts to `""`
//! and reads as its type's default, so any document rooted at
//! `corporations` loads.

use serde::{Deserialize, Deserializer, Serialize};

/// Root of every XML response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(deserialize_with = "element_or_default")]
    pub corporations: Corporations,
}

/// A converted element: children, or text when the element has none.
#[derive(Deserialize)]
#[serde(untagged)]
enum Node<T> {
    Element(T),
    Text(String),
}

impl<T: Default> Node<T> {
    fn into_inner(self) -> T {
        match self {
            Node::Element(value) => value,
            Node::Text(_) => T::default(),
        }
    }
}

fn element_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Node::deserialize(deserializer).map(Node::into_inner)
}

/// Collection metadata plus the matching records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Corporations {
    pub last_update_date: String,
    pub count: String,
    pub divide_number: String,
    pub divide_size: String,
    /// A lone record is not wrapped in a list, matching the document shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporation: Option<OneOrMany<Corporation>>,
}

impl Corporations {
    /// All records regardless of how many were returned.
    pub fn records(&self) -> &[Corporation] {
        match &self.corporation {
            Some(records) => records.as_slice(),
            None => &[],
        }
    }
}

/// One element, or a list when the element repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<'de, T> Deserialize<'de> for OneOrMany<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Shape<N> {
            Many(Vec<Node<N>>),
            One(Node<N>),
        }

        Ok(match Shape::deserialize(deserializer)? {
            Shape::Many(nodes) => OneOrMany::Many(nodes.into_iter().map(Node::into_inner).collect()),
            Shape::One(node) => OneOrMany::One(node.into_inner()),
        })
    }
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// A single corporate-number record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Corporation {
    pub sequence_number: String,
    pub corporate_number: String,
    /// Process code: `01` new, `11` name change, `12` domestic address
    /// change, `13` foreign address change, `21` closure, `22` revival,
    /// `71` merger, `72` merger invalidated, `81` trade name erased,
    /// `99` deleted.
    pub process: String,
    /// `1` when the record is a correction.
    pub correct: String,
    pub update_date: String,
    pub change_date: String,
    pub name: String,
    pub name_image_id: String,
    /// Detailed kind: `101`, `201`, `301`-`305`, `399`, `401`, `499`.
    pub kind: String,
    pub prefecture_name: String,
    pub city_name: String,
    pub street_number: String,
    pub address_image_id: String,
    pub prefecture_code: String,
    pub city_code: String,
    pub post_code: String,
    pub address_outside: String,
    #[serde(alias = "addressoutsideImageId")]
    pub address_outside_image_id: String,
    pub close_date: String,
    /// `01` liquidated, `11` dissolved by merger, `21` closed by the
    /// registrar, `31` other.
    pub close_cause: String,
    pub successor_corporate_number: String,
    pub change_cause: String,
    pub assignment_date: String,
    /// `1` for the latest record, `0` for history.
    pub latest: String,
    pub en_name: String,
    pub en_prefecture_name: String,
    pub en_city_name: String,
    pub en_address_outside: String,
    pub furigana: String,
    /// `1` when the record is excluded from search.
    pub hihyoji: String,
}

impl Corporation {
    pub fn is_latest(&self) -> bool {
        self.latest == "1"
    }

    pub fn is_closed(&self) -> bool {
        !self.close_date.is_empty()
    }

    pub fn is_search_excluded(&self) -> bool {
        self.hihyoji == "1"
    }
}
