//! Integration tests for apify-client

use apify_client::*;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn client_for(server: &MockServer) -> ApifyClient {
    ApifyClient::with_config(
        ApifyClientConfig::builder()
            .base_url(server.uri())
            .token("test-token")
            .retry(RetryConfig::immediate(2))
            .build(),
    )
    .unwrap()
}

fn data(value: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

fn not_found(error_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": { "type": error_type, "message": "Not here" }
    }))
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_get_resolves_and_normalizes_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/acts/alice~my-actor"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(data(json!({
            "id": "abc",
            "createdAt": "2020-01-01T02:00:00+02:00",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let actor = client_for(&server)
        .actor("alice/my-actor")
        .get()
        .await
        .unwrap()
        .expect("actor");

    assert_eq!(actor["id"], "abc");
    assert_eq!(actor["createdAt"], "2020-01-01T00:00:00.000Z");
    assert!(date_field(&actor, "createdAt").is_some());
}

#[tokio::test]
async fn test_get_missing_record_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets/gone"))
        .respond_with(not_found("record-not-found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/gone"))
        .respond_with(not_found("record-or-token-not-found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.dataset("gone").get().await.unwrap(), None);
    assert_eq!(client.key_value_store("gone").get().await.unwrap(), None);
}

#[tokio::test]
async fn test_other_not_found_types_propagate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(not_found("page-not-found"))
        .mount(&server)
        .await;

    let err = client_for(&server).dataset("x").get().await.unwrap_err();
    let api = err.api_error().expect("api error");
    assert_eq!(api.status_code, 404);
    assert_eq!(api.error_type.as_deref(), Some("page-not-found"));
    assert_eq!(api.client_method, "DatasetClient.get");
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/actor-tasks/t1"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v2/actor-tasks/t1"))
        .respond_with(not_found("record-not-found"))
        .mount(&server)
        .await;

    let task = client_for(&server).task("t1");
    tokio_test::assert_ok!(task.delete().await);
    tokio_test::assert_ok!(task.delete().await);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_client_errors_carry_method_label() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v2/schedules/s1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "invalid-input", "message": "Invalid cron expression" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .schedule("s1")
        .update(&json!({ "cronExpression": "nope" }))
        .await
        .unwrap_err();

    let api = err.api_error().unwrap();
    assert_eq!(api.message, "Invalid cron expression");
    assert_eq!(api.client_method, "ScheduleClient.update");
    assert_eq!(api.http_method, "PUT");
    assert_eq!(api.path, "/v2/schedules/s1");
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_missing_envelope_is_a_contract_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .mount(&server)
        .await;

    let err = client_for(&server).webhook("w1").get().await.unwrap_err();
    assert!(matches!(err, HttpClientError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_validation_happens_before_sending() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client.dataset("").get().await.unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client.dataset("d1").push_items(&json!([])).await.unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client
        .key_value_store("k1")
        .set_record("", "value", &SetRecordOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client
        .request_queue("q1")
        .add_request(&json!({ "id": "r1", "url": "https://example.com" }), false)
        .await
        .unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client
        .request_queue("q1")
        .update_request(&json!({ "url": "https://example.com" }), false)
        .await
        .unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client.datasets().get_or_create(Some(" ")).await.unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client.actor("a1").update(&json!([1, 2])).await.unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client.actors().create(&json!("my-actor")).await.unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    assert_eq!(request_count(&server).await, 0);
    assert_eq!(client.stats().calls(), 0);
}

#[tokio::test]
async fn test_children_of_empty_id_are_rejected_before_sending() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .actor("")
        .runs()
        .list(&ListOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client.actor("").last_run(None).get(None).await.unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    let err = client
        .run("")
        .dataset()
        .list_items(&DatasetItemsOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpClientError::Validation(_)));

    assert_eq!(request_count(&server).await, 0);
    assert_eq!(client.stats().calls(), 0);
}

#[tokio::test]
async fn test_wait_for_finish_returns_terminal_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/r1"))
        .and(query_param("waitForFinish", "30"))
        .respond_with(data(json!({ "id": "r1", "status": "SUCCEEDED" })))
        .expect(1)
        .mount(&server)
        .await;

    let run = client_for(&server)
        .run("r1")
        .wait_for_finish(Some(30))
        .await
        .unwrap();
    assert_eq!(ActorJobStatus::of(&run), Some(ActorJobStatus::Succeeded));
}

#[tokio::test]
async fn test_wait_for_finish_respects_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-builds/b1"))
        .respond_with(
            data(json!({ "id": "b1", "status": "RUNNING" })).set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let started = Instant::now();
    let build = client_for(&server)
        .build("b1")
        .wait_for_finish(Some(2))
        .await
        .unwrap();

    assert_eq!(build["status"], "RUNNING");
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_secs(5));

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() > 1);
    assert!(requests[0].url.query().unwrap().contains("waitForFinish=2"));
}

#[tokio::test]
async fn test_wait_for_finish_without_job_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/ghost"))
        .respond_with(not_found("record-not-found"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .run("ghost")
        .wait_for_finish(Some(1))
        .await
        .unwrap_err();

    assert!(matches!(err, HttpClientError::UnexpectedResponse(_)));
    assert!(request_count(&server).await >= 2);
}

#[tokio::test]
async fn test_call_starts_and_waits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/acts/alice~my-actor/runs"))
        .and(query_param("memory", "512"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": { "id": "r9", "status": "READY" } })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/r9"))
        .respond_with(data(json!({ "id": "r9", "status": "SUCCEEDED" })))
        .expect(1)
        .mount(&server)
        .await;

    let options = RunStartOptions {
        memory: Some(512),
        ..Default::default()
    };
    let run = client_for(&server)
        .actor("alice/my-actor")
        .call(Some(&json!({ "foo": "bar" })), &options, Some(10))
        .await
        .unwrap();
    assert_eq!(run["status"], "SUCCEEDED");

    let requests = server.received_requests().await.unwrap();
    let input: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(input["foo"], "bar");
}

#[tokio::test]
async fn test_last_run_filters_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/acts/abc/runs/last/dataset/items"))
        .and(query_param("status", "SUCCEEDED"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "n": 1 }]))
                .insert_header("x-apify-pagination-total", "1")
                .insert_header("x-apify-pagination-count", "1")
                .insert_header("x-apify-pagination-offset", "0")
                .insert_header("x-apify-pagination-limit", "1000"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let items = client_for(&server)
        .actor("abc")
        .last_run(Some(ActorJobStatus::Succeeded))
        .dataset()
        .list_items(&DatasetItemsOptions::default())
        .await
        .unwrap();
    assert_eq!(items.total, 1);
    assert_eq!(items.items[0]["n"], 1);
}

#[tokio::test]
async fn test_item_pagination_from_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets/d1/items"))
        .and(query_param("offset", "10"))
        .and(query_param("limit", "2"))
        .and(query_param("fields", "url,title"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "url": "a" }, { "url": "b" }]))
                .insert_header("x-apify-pagination-total", "50")
                .insert_header("x-apify-pagination-count", "2")
                .insert_header("x-apify-pagination-offset", "10")
                .insert_header("x-apify-pagination-limit", "2")
                .insert_header("x-apify-pagination-desc", "true"),
        )
        .mount(&server)
        .await;

    let options = DatasetItemsOptions {
        offset: Some(10),
        limit: Some(2),
        fields: vec!["url".to_string(), "title".to_string()],
        ..Default::default()
    };
    let page = client_for(&server)
        .dataset("d1")
        .list_items(&options)
        .await
        .unwrap();

    assert_eq!(page.total, 50);
    assert_eq!(page.count, 2);
    assert_eq!(page.offset, 10);
    assert_eq!(page.limit, 2);
    assert!(page.desc);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn test_item_pagination_tolerates_missing_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets/d1/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "url": "a" }, { "url": "b" }, { "url": "c" }]))
                .insert_header("x-apify-pagination-offset", "20")
                .insert_header("x-apify-pagination-limit", "not-a-number"),
        )
        .mount(&server)
        .await;

    let page = client_for(&server)
        .dataset("d1")
        .list_items(&DatasetItemsOptions::default())
        .await
        .unwrap();

    assert_eq!(page.count, 3);
    assert_eq!(page.offset, 20);
    assert_eq!(page.limit, 3);
    assert_eq!(page.total, 23);
    assert!(!page.desc);
    assert_eq!(page.items.len(), 3);
}

/// Collection backend of `total` entries serving at most `cap` per page.
struct PagedBackend {
    total: u64,
    cap: u64,
}

impl Respond for PagedBackend {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<u64>().ok())
        };
        let offset = query("offset").unwrap_or(0);
        let limit = query("limit").unwrap_or(self.cap).min(self.cap);
        let end = (offset + limit).min(self.total);
        let items: Vec<_> = (offset.min(end)..end).map(|i| json!({ "id": i })).collect();

        data(json!({
            "total": self.total,
            "count": items.len(),
            "offset": offset,
            "limit": limit,
            "desc": false,
            "items": items,
        }))
    }
}

#[tokio::test]
async fn test_list_all_spans_capped_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/datasets"))
        .respond_with(PagedBackend {
            total: 2500,
            cap: 1000,
        })
        .mount(&server)
        .await;

    let list = client_for(&server)
        .datasets()
        .list_all(&ListOptions::new().limit(1100))
        .await
        .unwrap();

    assert_eq!(list.items.len(), 1100);
    assert_eq!(list.total, 2500);
    assert_eq!(list.items[1099]["id"], 1099);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].url.query().unwrap().contains("limit=100"));
    assert!(requests[1].url.query().unwrap().contains("offset=1000"));
}

#[tokio::test]
async fn test_single_page_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs"))
        .and(query_param("status", "RUNNING"))
        .and(query_param("desc", "1"))
        .respond_with(PagedBackend { total: 3, cap: 1000 })
        .mount(&server)
        .await;

    let list = client_for(&server)
        .runs()
        .list(
            &ListOptions::new()
                .status(ActorJobStatus::Running)
                .desc(true),
        )
        .await
        .unwrap();
    assert_eq!(list.count, 3);
    assert_eq!(list.items.len(), 3);
}

#[tokio::test]
async fn test_push_items_gzips_large_payloads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/datasets/d1/items"))
        .and(header("content-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let items: Vec<_> = (0..200)
        .map(|i| json!({ "url": format!("https://example.com/page/{i}") }))
        .collect();
    tokio_test::assert_ok!(
        client_for(&server)
            .dataset("d1")
            .push_items(&serde_json::Value::Array(items))
            .await
    );
}

#[tokio::test]
async fn test_key_value_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/k1/records/greeting"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("hello", "text/plain"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/key-value-stores/k1/records/missing"))
        .respond_with(not_found("record-not-found"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/v2/key-value-stores/k1/records/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/key-value-stores/k1/records/config"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let store = client_for(&server).key_value_store("k1");

    let record = store.get_record("greeting", false).await.unwrap().unwrap();
    assert_eq!(record.value, ResponseBody::Text("hello".to_string()));
    assert_eq!(record.content_type.as_deref(), Some("text/plain"));

    let raw = store.get_record("greeting", true).await.unwrap().unwrap();
    assert_eq!(raw.value.into_bytes(), &b"hello"[..]);

    assert!(store.get_record("missing", false).await.unwrap().is_none());
    assert!(!store.record_exists("missing").await.unwrap());

    tokio_test::assert_ok!(
        store
            .set_record(
                "config",
                json!({ "maxPages": 10 }),
                &SetRecordOptions::default()
            )
            .await
    );
}

#[tokio::test]
async fn test_user_agent_and_retry_statistics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/users/me"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/users/me"))
        .respond_with(data(json!({ "username": "alice" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let user = client.user(None).get().await.unwrap().unwrap();
    assert_eq!(user["username"], "alice");

    let stats = client.stats().snapshot();
    assert_eq!(stats.calls, 1);
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.rate_limit_errors, vec![1]);

    let requests = server.received_requests().await.unwrap();
    let agent = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(agent.starts_with("ApifyClient/"));
}

#[tokio::test]
async fn test_task_input_must_be_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-tasks/t1/input"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "startUrls": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-tasks/t2/input"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-tasks/t3/input"))
        .respond_with(not_found("record-not-found"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let input = client.task("t1").get_input().await.unwrap().unwrap();
    assert_eq!(input, json!({ "startUrls": [] }));

    let err = client.task("t2").get_input().await.unwrap_err();
    assert!(matches!(err, HttpClientError::UnexpectedResponse(_)));

    assert!(client.task("t3").get_input().await.unwrap().is_none());
}

#[tokio::test]
async fn test_log_is_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/actor-runs/r1/log"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("line 1\nline 2", "text/plain"))
        .mount(&server)
        .await;

    let log = client_for(&server).run("r1").log().get().await.unwrap();
    assert_eq!(log.as_deref(), Some("line 1\nline 2"));
}
