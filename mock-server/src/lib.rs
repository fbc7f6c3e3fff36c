//! In-memory stand-in for the corporate-number registry Web-API.
//!
//! Serves `GET /{version}/num`, `/diff` and `/name` over a fixed set of
//! records. Valid requests get a registry-shaped XML document (`type=12`)
//! or CSV (`type=01|02`); invalid ones get a plain-text `"400,<message>"`
//! body, which is how the real service reports errors.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use quick_xml::escape::escape;
use tokio::net::TcpListener;
use tracing::{debug, info};

pub const SUPPORTED_VERSION: &str = "4";
pub const MAX_NUMBERS: usize = 10;
pub const DEFAULT_PAGE_SIZE: usize = 2000;

/// One registry row. Field names follow the XML element names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub corporate_number: String,
    pub process: String,
    pub correct: String,
    pub update_date: String,
    pub change_date: String,
    pub name: String,
    pub name_image_id: String,
    pub kind: String,
    pub prefecture_name: String,
    pub city_name: String,
    pub street_number: String,
    pub address_image_id: String,
    pub prefecture_code: String,
    pub city_code: String,
    pub post_code: String,
    pub address_outside: String,
    pub address_outside_image_id: String,
    pub close_date: String,
    pub close_cause: String,
    pub successor_corporate_number: String,
    pub change_cause: String,
    pub assignment_date: String,
    pub latest: String,
    pub en_name: String,
    pub en_prefecture_name: String,
    pub en_city_name: String,
    pub en_address_outside: String,
    pub furigana: String,
    pub hihyoji: String,
}

impl Record {
    fn elements(&self) -> [(&'static str, &str); 29] {
        [
            ("corporateNumber", self.corporate_number.as_str()),
            ("process", self.process.as_str()),
            ("correct", self.correct.as_str()),
            ("updateDate", self.update_date.as_str()),
            ("changeDate", self.change_date.as_str()),
            ("name", self.name.as_str()),
            ("nameImageId", self.name_image_id.as_str()),
            ("kind", self.kind.as_str()),
            ("prefectureName", self.prefecture_name.as_str()),
            ("cityName", self.city_name.as_str()),
            ("streetNumber", self.street_number.as_str()),
            ("addressImageId", self.address_image_id.as_str()),
            ("prefectureCode", self.prefecture_code.as_str()),
            ("cityCode", self.city_code.as_str()),
            ("postCode", self.post_code.as_str()),
            ("addressOutside", self.address_outside.as_str()),
            ("addressOutsideImageId", self.address_outside_image_id.as_str()),
            ("closeDate", self.close_date.as_str()),
            ("closeCause", self.close_cause.as_str()),
            ("successorCorporateNumber", self.successor_corporate_number.as_str()),
            ("changeCause", self.change_cause.as_str()),
            ("assignmentDate", self.assignment_date.as_str()),
            ("latest", self.latest.as_str()),
            ("enName", self.en_name.as_str()),
            ("enPrefectureName", self.en_prefecture_name.as_str()),
            ("enCityName", self.en_city_name.as_str()),
            ("enAddressOutside", self.en_address_outside.as_str()),
            ("furigana", self.furigana.as_str()),
            ("hihyoji", self.hihyoji.as_str()),
        ]
    }

    fn location_code(&self) -> String {
        format!("{}{}", self.prefecture_code, self.city_code)
    }

    /// Matches a two-digit request kind (`01`..`04`) against the detailed
    /// three-digit record kind (`101`, `301`, ...).
    fn has_kind(&self, requested: &str) -> bool {
        requested
            .split(',')
            .any(|code| code.len() == 2 && code.get(1..).is_some_and(|digit| self.kind.starts_with(digit)))
    }
}

/// The record set and paging behavior behind the router.
#[derive(Clone, Debug)]
pub struct Registry {
    pub last_update_date: String,
    pub page_size: usize,
    pub records: Vec<Record>,
}

impl Registry {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            last_update_date: "2024-01-31".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            records,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Six records covering a national body, a local authority, a live and
    /// a closed company, a superseded history row and a foreign company.
    pub fn fixtures() -> Self {
        let base = |number: &str, name: &str, kind: &str| Record {
            corporate_number: number.to_string(),
            process: "01".to_string(),
            correct: "0".to_string(),
            name: name.to_string(),
            kind: kind.to_string(),
            latest: "1".to_string(),
            hihyoji: "0".to_string(),
            assignment_date: "2015-10-05".to_string(),
            update_date: "2015-10-05".to_string(),
            change_date: "2015-10-05".to_string(),
            ..Record::default()
        };

        Self::new(vec![
            Record {
                prefecture_name: "東京都".to_string(),
                city_name: "千代田区".to_string(),
                street_number: "霞が関３丁目１－１".to_string(),
                prefecture_code: "13".to_string(),
                city_code: "101".to_string(),
                post_code: "1008978".to_string(),
                en_name: "National Tax Agency".to_string(),
                en_prefecture_name: "Tokyo".to_string(),
                en_city_name: "3-1-1 Kasumigaseki, Chiyoda ku".to_string(),
                furigana: "コクゼイチョウ".to_string(),
                ..base("7000012050002", "国税庁", "101")
            },
            Record {
                prefecture_name: "北海道".to_string(),
                city_name: "札幌市中央区".to_string(),
                street_number: "北一条西２丁目".to_string(),
                prefecture_code: "01".to_string(),
                city_code: "101".to_string(),
                post_code: "0608611".to_string(),
                furigana: "サッポロシ".to_string(),
                ..base("9000020011002", "札幌市", "201")
            },
            Record {
                process: "11".to_string(),
                update_date: "2019-01-15".to_string(),
                change_date: "2019-01-10".to_string(),
                prefecture_name: "東京都".to_string(),
                city_name: "中央区".to_string(),
                street_number: "日本橋１丁目１－１".to_string(),
                prefecture_code: "13".to_string(),
                city_code: "102".to_string(),
                post_code: "1030027".to_string(),
                en_name: "Test Shoji Co., Ltd.".to_string(),
                furigana: "テストショウジ".to_string(),
                ..base("1010001000001", "株式会社テスト商事", "301")
            },
            Record {
                process: "11".to_string(),
                update_date: "2018-06-01".to_string(),
                change_date: "2018-06-01".to_string(),
                latest: "0".to_string(),
                prefecture_name: "東京都".to_string(),
                city_name: "中央区".to_string(),
                street_number: "日本橋１丁目１－１".to_string(),
                prefecture_code: "13".to_string(),
                city_code: "102".to_string(),
                furigana: "テストショウジ".to_string(),
                ..base("1010001000001", "テスト商事有限会社", "302")
            },
            Record {
                process: "21".to_string(),
                update_date: "2019-01-20".to_string(),
                change_date: "2019-01-18".to_string(),
                close_date: "2019-01-18".to_string(),
                close_cause: "01".to_string(),
                prefecture_name: "大阪府".to_string(),
                city_name: "大阪市北区".to_string(),
                street_number: "梅田１丁目１－１".to_string(),
                prefecture_code: "27".to_string(),
                city_code: "127".to_string(),
                post_code: "5300001".to_string(),
                en_name: "Test Kogyo Co., Ltd.".to_string(),
                furigana: "テストコウギョウ".to_string(),
                ..base("2120001000002", "株式会社テスト工業", "301")
            },
            Record {
                update_date: "2019-01-25".to_string(),
                prefecture_code: "99".to_string(),
                address_outside: "アメリカ合衆国ニューヨーク州".to_string(),
                en_address_outside: "New York, USA".to_string(),
                en_name: "Test Inc.".to_string(),
                furigana: "テストインク".to_string(),
                ..base("3700150000003", "テスト・インク", "401")
            },
        ])
    }
}

pub type Db = Arc<Registry>;

pub fn app() -> Router {
    app_with(Registry::fixtures())
}

pub fn app_with(registry: Registry) -> Router {
    let db: Db = Arc::new(registry);
    Router::new()
        .route("/{version}/num", get(lookup_number))
        .route("/{version}/diff", get(lookup_diff))
        .route("/{version}/name", get(lookup_name))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, Registry::fixtures()).await
}

pub async fn serve(listener: TcpListener, registry: Registry) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, records = registry.records.len(), "mock registry listening");
    }
    axum::serve(listener, app_with(registry)).await
}

type Params = HashMap<String, String>;

/// Plain-text error body in the registry's `"<code>,<message>"` form.
#[derive(Debug)]
pub struct Rejection(String);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("400,{}", self.0),
        )
            .into_response()
    }
}

fn reject(message: impl Into<String>) -> Rejection {
    Rejection(message.into())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Csv,
    Xml,
}

fn check_common(version: &str, params: &Params) -> Result<Format, Rejection> {
    if version != SUPPORTED_VERSION {
        return Err(reject(format!("unsupported version {version}")));
    }
    match params.get("id") {
        Some(id) if !id.is_empty() => {}
        _ => return Err(reject("id is required")),
    }
    match params.get("type").map(String::as_str) {
        Some("12") => Ok(Format::Xml),
        Some("01") | Some("02") => Ok(Format::Csv),
        _ => Err(reject("type is invalid")),
    }
}

fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

fn date_param<'a>(params: &'a Params, key: &str, required: bool) -> Result<Option<&'a str>, Rejection> {
    match params.get(key) {
        Some(value) if is_iso_date(value) => Ok(Some(value.as_str())),
        Some(value) => Err(reject(format!("{key} is not a date: {value}"))),
        None if required => Err(reject(format!("{key} is required"))),
        None => Ok(None),
    }
}

fn within(date: &str, from: Option<&str>, to: Option<&str>) -> bool {
    from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
}

fn matches_location(record: &Record, params: &Params) -> bool {
    params
        .get("address")
        .is_none_or(|code| record.location_code().starts_with(code.as_str()))
}

fn matches_kind(record: &Record, params: &Params) -> bool {
    params.get("kind").is_none_or(|kind| record.has_kind(kind))
}

fn respond(db: &Registry, format: Format, matched: Vec<&Record>, params: &Params) -> Result<Response, Rejection> {
    let divide_size = matched.len().div_ceil(db.page_size).max(1);
    let divide_number = match params.get("divide") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=divide_size).contains(n))
            .ok_or_else(|| reject(format!("divide is out of range: {raw}")))?,
        None => 1,
    };
    let page: Vec<&Record> = matched
        .iter()
        .skip((divide_number - 1) * db.page_size)
        .take(db.page_size)
        .copied()
        .collect();
    let summary = Header {
        last_update_date: &db.last_update_date,
        count: matched.len(),
        divide_number,
        divide_size,
    };

    let response = match format {
        Format::Xml => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            render_xml(&summary, &page),
        )
            .into_response(),
        Format::Csv => (
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            render_csv(&summary, &page),
        )
            .into_response(),
    };
    Ok(response)
}

async fn lookup_number(
    State(db): State<Db>,
    Path(version): Path<String>,
    Query(params): Query<Params>,
) -> Result<Response, Rejection> {
    let format = check_common(&version, &params)?;
    let numbers: Vec<&str> = params
        .get("number")
        .map(|raw| raw.split(',').collect())
        .ok_or_else(|| reject("number is required"))?;
    if numbers.len() > MAX_NUMBERS {
        return Err(reject(format!("at most {MAX_NUMBERS} numbers are allowed")));
    }
    if let Some(bad) = numbers
        .iter()
        .find(|n| n.len() != 13 || !n.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(reject(format!("number is invalid: {bad}")));
    }
    let history = params.get("history").map(String::as_str) == Some("1");
    debug!(?numbers, history, "num lookup");

    let matched: Vec<&Record> = numbers
        .iter()
        .flat_map(|number| {
            db.records
                .iter()
                .filter(move |r| r.corporate_number == *number && (history || r.latest == "1"))
        })
        .collect();
    respond(&db, format, matched, &params)
}

async fn lookup_diff(
    State(db): State<Db>,
    Path(version): Path<String>,
    Query(params): Query<Params>,
) -> Result<Response, Rejection> {
    let format = check_common(&version, &params)?;
    let from = date_param(&params, "from", true)?;
    let to = date_param(&params, "to", true)?;
    if from > to {
        return Err(reject("from is after to"));
    }
    debug!(?from, ?to, "diff lookup");

    let matched: Vec<&Record> = db
        .records
        .iter()
        .filter(|r| {
            within(&r.update_date, from, to) && matches_location(r, &params) && matches_kind(r, &params)
        })
        .collect();
    respond(&db, format, matched, &params)
}

async fn lookup_name(
    State(db): State<Db>,
    Path(version): Path<String>,
    Query(params): Query<Params>,
) -> Result<Response, Rejection> {
    let format = check_common(&version, &params)?;
    let needle = params
        .get("name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| reject("name is required"))?;
    let partial = params.get("mode").map(String::as_str) == Some("2");
    let english = params.get("target").map(String::as_str) == Some("3");
    let change = params.get("change").map(String::as_str) == Some("1");
    let close = params.get("close").map(String::as_str) != Some("0");
    let from = date_param(&params, "from", false)?;
    let to = date_param(&params, "to", false)?;
    debug!(%needle, partial, english, change, close, "name lookup");

    let matched: Vec<&Record> = db
        .records
        .iter()
        .filter(|r| {
            let haystack = if english { &r.en_name } else { &r.name };
            let name_matches = if partial {
                haystack.contains(needle.as_str())
            } else {
                haystack.starts_with(needle.as_str())
            };
            name_matches
                && (change || r.latest == "1")
                && (close || r.close_date.is_empty())
                && within(&r.assignment_date, from, to)
                && matches_location(r, &params)
                && matches_kind(r, &params)
        })
        .collect();
    respond(&db, format, matched, &params)
}

struct Header<'a> {
    last_update_date: &'a str,
    count: usize,
    divide_number: usize,
    divide_size: usize,
}

fn render_xml(header: &Header<'_>, page: &[&Record]) -> String {
    let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><corporations>"#);
    out.push_str(&format!(
        "<lastUpdateDate>{}</lastUpdateDate><count>{}</count><divideNumber>{}</divideNumber><divideSize>{}</divideSize>",
        header.last_update_date, header.count, header.divide_number, header.divide_size
    ));
    for (i, record) in page.iter().enumerate() {
        out.push_str("<corporation>");
        out.push_str(&format!("<sequenceNumber>{}</sequenceNumber>", i + 1));
        for (tag, value) in record.elements() {
            out.push_str(&format!("<{tag}>{}</{tag}>", escape(value)));
        }
        out.push_str("</corporation>");
    }
    out.push_str("</corporations>");
    out
}

fn render_csv(header: &Header<'_>, page: &[&Record]) -> String {
    let mut out = format!(
        "{},{},{},{}\n",
        header.last_update_date, header.count, header.divide_number, header.divide_size
    );
    for (i, record) in page.iter().enumerate() {
        let mut row = vec![(i + 1).to_string()];
        row.extend(record.elements().iter().map(|(_, value)| format!("\"{value}\"")));
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
