//! Lookups against the live mock registry.
//!
//! # Design
//! Starts the mock server on a random port, then drives every client
//! operation over real HTTP through the default reqwest transport. Checks
//! that request building and response parsing agree with the server's
//! reading of the wire format.

use chrono::NaiveDate;
use houjin_core::{
    ApiError, ClientConfig, DiffQuery, KindParameter, MatchMode, MatchTarget, NameQuery, NumberQuery, QueryClient,
    ResponseType,
};
use mock_server::Registry;

const APP_ID: &str = "integration-app";

async fn start(registry: Registry) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::serve(listener, registry));
    format!("http://{addr}")
}

async fn client_with(config: ClientConfig, registry: Registry) -> QueryClient {
    let base = start(registry).await;
    QueryClient::new(APP_ID, config.with_base_url(base)).unwrap()
}

async fn client() -> QueryClient {
    client_with(ClientConfig::default(), Registry::fixtures()).await
}

#[tokio::test]
async fn num_single_record_is_unwrapped() {
    let client = client().await;
    let data = client.num(&NumberQuery::new("7000012050002")).await.unwrap();

    assert_eq!(data.corporations.count, "1");
    assert_eq!(data.corporations.last_update_date, "2024-01-31");
    let records = data.corporations.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "国税庁");
    assert_eq!(records[0].prefecture_code, "13");
    assert_eq!(records[0].close_date, "");
}

#[tokio::test]
async fn num_multiple_numbers_and_forced_xml() {
    let client = client().await;
    let query = NumberQuery::new(["7000012050002", "9000020011002"]).with_response_type(ResponseType::CsvShiftJis);
    let data = client.num(&query).await.unwrap();

    let names: Vec<&str> = data.corporations.records().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["国税庁", "札幌市"]);
}

#[tokio::test]
async fn num_history_flag_returns_past_rows() {
    let client = client().await;
    let data = client
        .num(&NumberQuery::new("1010001000001").with_history(true))
        .await
        .unwrap();
    let records = data.corporations.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().any(|c| !c.is_latest()));
}

#[tokio::test]
async fn num_too_many_numbers_surfaces_server_text() {
    let client = client().await;
    let numbers: Vec<String> = (0..11).map(|_| "7000012050002".to_string()).collect();
    let err = client.num(&NumberQuery::new(numbers)).await.unwrap_err();
    match err {
        ApiError::InvalidResponseBody { body, .. } => assert_eq!(body, "400,at most 10 numbers are allowed"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn diff_with_date_values() {
    let client = client().await;
    let query = DiffQuery::new(
        NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2019, 1, 31).unwrap(),
    );
    let data = client.diff(&query).await.unwrap();
    assert_eq!(data.corporations.count, "3");
    assert_eq!(data.corporations.records().len(), 3);
}

#[tokio::test]
async fn diff_unformatted_date_text_is_sent_as_is() {
    let client = client().await;
    let err = client
        .diff(&DiffQuery::new("2019/01/01", "2019-01-31"))
        .await
        .unwrap_err();
    assert_eq!(err.body(), Some("400,from is not a date: 2019/01/01"));
}

#[tokio::test]
async fn diff_kind_filter_with_corrected_key() {
    let client = client().await;
    let query = DiffQuery::new("2019-01-01", "2019-01-31").with_address("27").with_kind(3);
    let data = client.diff(&query).await.unwrap();
    let records = data.corporations.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "株式会社テスト工業");
}

#[tokio::test]
async fn diff_kind_filter_with_legacy_key_overwrites_address() {
    let config = ClientConfig::default().with_kind_parameter(KindParameter::Address);
    let client = client_with(config, Registry::fixtures()).await;
    let query = DiffQuery::new("2019-01-01", "2019-01-31").with_address("27").with_kind(3);

    // `address=03` matches no location, and no kind filter reaches the server.
    let data = client.diff(&query).await.unwrap();
    assert_eq!(data.corporations.count, "0");
    assert!(data.corporations.corporation.is_none());
}

#[tokio::test]
async fn diff_partition_number_is_forwarded() {
    let client = client_with(ClientConfig::default(), Registry::fixtures().with_page_size(2)).await;
    let query = DiffQuery::new("2019-01-01", "2019-01-31").with_divide(2);
    let data = client.diff(&query).await.unwrap();
    assert_eq!(data.corporations.divide_number, "2");
    assert_eq!(data.corporations.divide_size, "2");
    assert_eq!(data.corporations.records().len(), 1);
}

#[tokio::test]
async fn name_search_modes() {
    let client = client().await;

    let prefix = client.name(&NameQuery::new("テスト")).await.unwrap();
    assert_eq!(prefix.corporations.records().len(), 1);

    let partial = client
        .name(&NameQuery::new("テスト").with_mode(MatchMode::Partial).with_close(false))
        .await
        .unwrap();
    let names: Vec<&str> = partial.corporations.records().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["株式会社テスト商事", "テスト・インク"]);
}

#[tokio::test]
async fn name_english_target_with_assignment_range() {
    let client = client().await;
    let query = NameQuery::new("Test")
        .with_target(MatchTarget::English)
        .with_from(NaiveDate::from_ymd_opt(2015, 10, 5).unwrap())
        .with_to("2015-12-31");
    let data = client.name(&query).await.unwrap();
    assert_eq!(data.corporations.records().len(), 3);
}

#[tokio::test]
async fn name_change_flag_includes_history() {
    let client = client().await;
    let data = client
        .name(&NameQuery::new("テスト商事").with_change(1))
        .await
        .unwrap();
    assert_eq!(data.corporations.records()[0].kind, "302");
}

#[tokio::test]
async fn wrong_version_fails_with_server_text() {
    let config = ClientConfig::default().with_version("3");
    let client = client_with(config, Registry::fixtures()).await;
    let err = client.num(&NumberQuery::new("7000012050002")).await.unwrap_err();
    assert_eq!(err.body(), Some("400,unsupported version 3"));
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let client = client().await;
    let by_number = NumberQuery::new("7000012050002");
    let by_date = DiffQuery::new("2019-01-01", "2019-01-31");
    let by_name = NameQuery::new("札幌");
    let (a, b, c) = tokio::join!(
        client.num(&by_number),
        client.diff(&by_date),
        client.name(&by_name),
    );
    assert_eq!(a.unwrap().corporations.count, "1");
    assert_eq!(b.unwrap().corporations.count, "3");
    assert_eq!(c.unwrap().corporations.count, "1");
}
