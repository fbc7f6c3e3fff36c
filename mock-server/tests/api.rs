use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Registry};
use tower::ServiceExt;

const ID: &str = "test-app";

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn call(uri: &str) -> (StatusCode, String) {
    let resp = app().oneshot(get(uri)).await.unwrap();
    let status = resp.status();
    (status, body_text(resp).await)
}

fn count_of(xml: &str) -> usize {
    let start = xml.find("<count>").unwrap() + "<count>".len();
    let end = xml.find("</count>").unwrap();
    xml[start..end].parse().unwrap()
}

// --- common validation ---

#[tokio::test]
async fn missing_id_is_plain_text_error() {
    let (status, body) = call("/4/num?number=7000012050002&type=12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "400,id is required");
}

#[tokio::test]
async fn unsupported_version_is_rejected() {
    let (status, body) = call(&format!("/3/num?id={ID}&number=7000012050002&type=12")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("400,unsupported version"));
}

#[tokio::test]
async fn missing_type_is_rejected() {
    let (_, body) = call(&format!("/4/num?id={ID}&number=7000012050002")).await;
    assert_eq!(body, "400,type is invalid");
}

// --- num ---

#[tokio::test]
async fn num_returns_xml_document() {
    let resp = app()
        .oneshot(get(&format!("/4/num?id={ID}&number=7000012050002&type=12&history=0")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/xml; charset=utf-8"
    );
    let body = body_text(resp).await;
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<name>国税庁</name>"));
    assert_eq!(count_of(&body), 1);
}

#[tokio::test]
async fn num_csv_type_returns_csv() {
    let (status, body) = call(&format!("/4/num?id={ID}&number=7000012050002&type=01")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("2024-01-31,1,1,1\n"));
    assert!(!body.contains('<'));
}

#[tokio::test]
async fn num_history_includes_superseded_rows() {
    let (_, latest) = call(&format!("/4/num?id={ID}&number=1010001000001&type=12&history=0")).await;
    assert_eq!(count_of(&latest), 1);

    let (_, history) = call(&format!("/4/num?id={ID}&number=1010001000001&type=12&history=1")).await;
    assert_eq!(count_of(&history), 2);
    assert!(history.contains("テスト商事有限会社"));
}

#[tokio::test]
async fn num_accepts_comma_joined_numbers() {
    let (_, body) = call(&format!("/4/num?id={ID}&number=7000012050002%2C9000020011002&type=12")).await;
    assert_eq!(count_of(&body), 2);
}

#[tokio::test]
async fn num_rejects_more_than_ten_numbers() {
    let numbers = vec!["7000012050002"; 11].join(",");
    let (status, body) = call(&format!("/4/num?id={ID}&number={numbers}&type=12")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "400,at most 10 numbers are allowed");
}

#[tokio::test]
async fn num_rejects_malformed_number() {
    let (_, body) = call(&format!("/4/num?id={ID}&number=123&type=12")).await;
    assert_eq!(body, "400,number is invalid: 123");
}

// --- diff ---

#[tokio::test]
async fn diff_filters_by_update_date() {
    let (_, body) = call(&format!("/4/diff?id={ID}&from=2019-01-01&to=2019-01-31&type=12")).await;
    assert_eq!(count_of(&body), 3);
}

#[tokio::test]
async fn diff_filters_by_location_and_kind() {
    let (_, by_address) =
        call(&format!("/4/diff?id={ID}&from=2019-01-01&to=2019-01-31&type=12&address=13")).await;
    assert_eq!(count_of(&by_address), 1);

    let (_, by_kind) = call(&format!("/4/diff?id={ID}&from=2019-01-01&to=2019-01-31&type=12&kind=04")).await;
    assert_eq!(count_of(&by_kind), 1);
    assert!(by_kind.contains("テスト・インク"));
}

#[tokio::test]
async fn diff_non_ascii_kind_matches_nothing() {
    let (status, body) = call(&format!("/4/diff?id={ID}&from=2019-01-01&to=2019-01-31&type=12&kind=%C3%A9")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_of(&body), 0);
}

#[tokio::test]
async fn diff_requires_iso_dates() {
    let (status, body) = call(&format!("/4/diff?id={ID}&from=2019/01/01&to=2019-01-31&type=12")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "400,from is not a date: 2019/01/01");
}

#[tokio::test]
async fn diff_partitions_results() {
    let app = app_with(Registry::fixtures().with_page_size(2));
    let resp = app
        .oneshot(get(&format!("/4/diff?id={ID}&from=2019-01-01&to=2019-01-31&type=12&divide=2")))
        .await
        .unwrap();
    let body = body_text(resp).await;
    assert!(body.contains("<divideNumber>2</divideNumber><divideSize>2</divideSize>"));
    assert_eq!(body.matches("<corporation>").count(), 1);
}

#[tokio::test]
async fn diff_divide_out_of_range_is_rejected() {
    let (_, body) = call(&format!("/4/diff?id={ID}&from=2019-01-01&to=2019-01-31&type=12&divide=5")).await;
    assert_eq!(body, "400,divide is out of range: 5");
}

// --- name ---

#[tokio::test]
async fn name_prefix_and_partial_modes() {
    let (_, prefix) = call(&format!("/4/name?id={ID}&type=12&name=%E3%83%86%E3%82%B9%E3%83%88")).await;
    assert_eq!(count_of(&prefix), 1, "only テスト・インク starts with テスト");

    let (_, partial) = call(&format!("/4/name?id={ID}&type=12&name=%E3%83%86%E3%82%B9%E3%83%88&mode=2")).await;
    assert_eq!(count_of(&partial), 3);
}

#[tokio::test]
async fn name_close_flag_excludes_closed_records() {
    let (_, body) = call(&format!(
        "/4/name?id={ID}&type=12&name=%E3%83%86%E3%82%B9%E3%83%88&mode=2&close=0"
    ))
    .await;
    assert_eq!(count_of(&body), 2);
    assert!(!body.contains("株式会社テスト工業"));
}

#[tokio::test]
async fn name_english_target() {
    let (_, body) = call(&format!("/4/name?id={ID}&type=12&name=National&target=3")).await;
    assert_eq!(count_of(&body), 1);
    assert!(body.contains("<corporateNumber>7000012050002</corporateNumber>"));
}

#[tokio::test]
async fn name_without_matches_has_empty_collection() {
    let (status, body) = call(&format!("/4/name?id={ID}&type=12&name=nothing")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_of(&body), 0);
    assert!(!body.contains("<corporation>"));
}

#[tokio::test]
async fn name_is_required() {
    let (_, body) = call(&format!("/4/name?id={ID}&type=12")).await;
    assert_eq!(body, "400,name is required");
}
