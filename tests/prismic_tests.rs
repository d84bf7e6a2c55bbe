//! Prismic REST client against a local tiny_http API.

use ardoise::ArdoiseError;
use ardoise::content::{ContentSource, Direction, PrismicClient, Query};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const API_ROOT: &str = r#"{
    "refs": [
        { "id": "preview", "ref": "preview-ref", "isMasterRef": false },
        { "id": "master", "ref": "master-ref-123", "isMasterRef": true }
    ]
}"#;

struct TestApi {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestApi {
    fn client(&self, prefix: &str, token: Option<&str>) -> PrismicClient {
        PrismicClient::new(
            &format!("{}{}/api/v2", self.base, prefix),
            token.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    /// Request URLs (path and query) whose path is `path`.
    fn requests_to(&self, path: &str) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.split('?').next() == Some(path))
            .cloned()
            .collect()
    }
}

fn json_response(body: String) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    tiny_http::Response::from_data(body.into_bytes()).with_header(
        "Content-Type: application/json"
            .parse::<tiny_http::Header>()
            .unwrap(),
    )
}

/// One result per search, so the result count tells how many searches ran.
const SEARCH_RESULTS: &str = r#"{
    "page": 1,
    "results": [{ "id": "doc-1", "type": "dish", "data": {} }]
}"#;

fn start_api() -> TestApi {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            log.lock().unwrap().push(url.clone());

            let path = url.split('?').next().unwrap_or_default();
            let response = match path {
                "/api/v2" => json_response(API_ROOT.to_string()),
                "/api/v2/documents/search" => json_response(SEARCH_RESULTS.to_string()),
                "/norefs/api/v2" => json_response(r#"{ "refs": [] }"#.to_string()),
                "/garbled/api/v2" => json_response("<html>maintenance</html>".to_string()),
                _ => json_response("{}".to_string()).with_status_code(503),
            };
            let _ = request.respond(response);
        }
    });

    TestApi {
        base: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn params(url: &str) -> HashMap<String, String> {
    let parsed = reqwest::Url::parse(&format!("http://localhost{}", url)).unwrap();
    parsed.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn test_search_sends_ref_predicates_and_orderings() {
    let api = start_api();
    let query = Query::of_type("weekly_highlights")
        .order_by("my.weekly_highlights.week_start", Direction::Desc)
        .page_size(1);

    let documents = api.client("", None).query(&query).await.unwrap();
    assert_eq!(documents.len(), 1);

    assert_eq!(api.requests_to("/api/v2").len(), 1);
    let searches = api.requests_to("/api/v2/documents/search");
    assert_eq!(searches.len(), 1);

    let sent = params(&searches[0]);
    assert_eq!(sent["ref"], "master-ref-123");
    assert_eq!(sent["q"], r#"[[at(document.type, "weekly_highlights")]]"#);
    assert_eq!(sent["orderings"], "[my.weekly_highlights.week_start desc]");
    assert_eq!(sent["pageSize"], "1");
    assert!(!sent.contains_key("access_token"));
}

#[tokio::test]
async fn test_unordered_query_omits_orderings() {
    let api = start_api();
    api.client("", None)
        .query(&Query::of_type("menu_template").page_size(100))
        .await
        .unwrap();

    let sent = params(&api.requests_to("/api/v2/documents/search")[0]);
    assert_eq!(sent["pageSize"], "100");
    assert!(!sent.contains_key("orderings"));
}

#[tokio::test]
async fn test_access_token_sent_on_every_request() {
    let api = start_api();
    api.client("", Some("s3cret"))
        .query(&Query::of_type("daily_menu"))
        .await
        .unwrap();

    let all = api.requests.lock().unwrap().clone();
    assert_eq!(all.len(), 2);
    for url in &all {
        assert_eq!(params(url)["access_token"], "s3cret");
    }
}

#[tokio::test]
async fn test_get_by_ids_chunks_at_page_limit() {
    let api = start_api();
    let ids: Vec<String> = (0..150).map(|i| format!("dish-{}", i)).collect();

    let documents = api.client("", None).get_by_ids(&ids).await.unwrap();
    assert_eq!(documents.len(), 2);

    let searches = api.requests_to("/api/v2/documents/search");
    assert_eq!(searches.len(), 2);

    let first = params(&searches[0]);
    assert_eq!(first["pageSize"], "100");
    assert!(first["q"].starts_with(r#"[[in(document.id, ["dish-0", "dish-1", "#));
    assert!(first["q"].contains(r#""dish-99"]"#));

    let second = params(&searches[1]);
    assert_eq!(second["pageSize"], "50");
    assert!(second["q"].starts_with(r#"[[in(document.id, ["dish-100", "#));
    assert!(second["q"].ends_with(r#""dish-149"])]]"#));
}

#[tokio::test]
async fn test_get_by_ids_without_ids_sends_nothing() {
    let api = start_api();
    let documents = api.client("", None).get_by_ids(&[]).await.unwrap();

    assert!(documents.is_empty());
    assert!(api.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_is_query_error() {
    let api = start_api();
    let err = api
        .client("/down", None)
        .query(&Query::of_type("daily_menu"))
        .await
        .unwrap_err();

    assert!(matches!(err, ArdoiseError::Query(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_missing_master_ref_is_query_error() {
    let api = start_api();
    let err = api
        .client("/norefs", None)
        .query(&Query::of_type("daily_menu"))
        .await
        .unwrap_err();

    assert!(matches!(err, ArdoiseError::Query(ref m) if m.contains("master ref")));
    assert!(api.requests_to("/norefs/api/v2/documents/search").is_empty());
}

#[tokio::test]
async fn test_non_json_body_is_query_error() {
    let api = start_api();
    let err = api
        .client("/garbled", None)
        .query(&Query::of_type("daily_menu"))
        .await
        .unwrap_err();

    assert!(matches!(err, ArdoiseError::Query(ref m) if m.contains("Invalid response")));
}
