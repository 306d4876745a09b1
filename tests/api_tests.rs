use proxy_dashboard::models::{LogEntry, MetricsSnapshot};
use proxy_dashboard::views::{LogsView, Panel, RealTimeView};
use proxy_dashboard::{ApiClient, DataSource};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// nothing listens on port 1
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn client_for(server: &MockServer) -> ApiClient {
    assert_ok!(ApiClient::new(server.uri(), None))
}

fn sample_metrics() -> serde_json::Value {
    json!({
        "total_requests": 5321,
        "cache_hits": 4100,
        "cache_misses": 1221,
        "rpsSeries": [{"t": "10:00", "v": 14}, {"t": "10:01", "v": 17.5}],
        "timeseries": [{"t": "10:00", "rtt": "0.081"}],
        "cpu": 41.2,
        "ram": 73.9,
        "heatmap": [[0, 1, 2], [3, 4, 5]]
    })
}

#[tokio::test]
async fn test_live_metrics_are_returned_untransformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_metrics()))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client_for(&server).get_metrics().await;
    assert!(fetched.is_live());

    let expected: MetricsSnapshot = serde_json::from_value(sample_metrics()).unwrap();
    let snapshot = fetched.into_inner();
    assert_eq!(snapshot, expected);
    assert_eq!(serde_json::to_value(&snapshot).unwrap(), sample_metrics_normalized());
}

fn sample_metrics_normalized() -> serde_json::Value {
    // integers in number-typed fields come back as floats after a round trip
    let mut value = sample_metrics();
    value["rpsSeries"][0]["v"] = json!(14.0);
    value
}

#[tokio::test]
async fn test_unreachable_metrics_fall_back() {
    let client = ApiClient::new(UNREACHABLE, Some(Duration::from_secs(2))).unwrap();

    let fetched = client.get_metrics().await;
    assert!(fetched.is_fallback());

    let snapshot = fetched.into_inner();
    assert_eq!(snapshot.rps_series.len(), 12);
    assert_eq!(snapshot.cpu, 34.0);
    assert_eq!(snapshot.ram, 62.0);
    assert_eq!(snapshot.heatmap.len(), 7);
    for row in &snapshot.heatmap {
        assert_eq!(row.len(), 24);
        assert!(row.iter().all(|&hits| hits < 5));
    }
}

#[tokio::test]
async fn test_error_status_and_bad_json_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blacklist"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let metrics = client.get_metrics().await;
    assert!(metrics.is_fallback());
    assert_eq!(metrics.value().total_requests, 1200);

    let blacklist = client.get_blacklist().await;
    assert!(blacklist.is_fallback());
    assert_eq!(blacklist.into_inner(), vec!["facebook.com", "example.org"]);

    let stats = client.stats().await;
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.live, 0);
}

#[tokio::test]
async fn test_logs_with_limit_are_returned_unmodified() {
    let server = MockServer::start().await;
    let entries: Vec<serde_json::Value> = (0..5)
        .map(|i| {
            json!({
                "timestamp": format!("2024-05-01T10:00:0{}", i),
                "client": [json!(format!("10.0.0.{}", i)), json!(51234 + i)],
                "host": format!("site{}.example", i)
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&entries))
        .expect(1)
        .mount(&server)
        .await;

    let logs = client_for(&server).get_logs(10).await;
    assert!(logs.is_live());

    let expected: Vec<LogEntry> = serde_json::from_value(json!(entries)).unwrap();
    let logs = logs.into_inner();
    assert_eq!(logs.len(), 5);
    assert_eq!(logs, expected);
    assert_eq!(logs[2].client_id(), "10.0.0.2");
    assert_eq!(logs[2].client[1], "51236");
}

#[tokio::test]
async fn test_logs_with_address_tuples_stay_live() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"event": "cache_hit", "host": "a.com", "client": ["127.0.0.1", 54321], "timestamp": "2024-05-01 10:00:00"},
            {"event": "cache_miss", "host": "b.org", "client": null, "timestamp": 1714557601},
            {"event": "blocked", "host": null, "client": ["10.0.0.9", 40100]}
        ])))
        .mount(&server)
        .await;

    let logs = client_for(&server).get_logs(50).await;
    assert!(logs.is_live());

    let logs = logs.into_inner();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].client, vec!["127.0.0.1", "54321"]);
    assert_eq!(logs[0].client_id(), "127.0.0.1");
    assert!(logs[1].client.is_empty());
    assert_eq!(logs[1].timestamp, "1714557601");
    assert_eq!(logs[2].display_host(), "-");
    assert_eq!(logs[2].client_id(), "10.0.0.9");
}

#[tokio::test]
async fn test_logs_truncated_to_limit() {
    let server = MockServer::start().await;
    let entries: Vec<serde_json::Value> = (0..8)
        .map(|i| json!({"timestamp": i, "client": [], "host": "a.example"}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&entries))
        .mount(&server)
        .await;

    let logs = client_for(&server).get_logs(3).await.into_inner();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].timestamp, "0");
}

#[tokio::test]
async fn test_unreachable_logs_are_empty() {
    let client = ApiClient::new(UNREACHABLE, None).unwrap();
    let logs = client.get_logs(25).await;
    assert!(logs.is_fallback());
    assert!(logs.into_inner().is_empty());
}

#[tokio::test]
async fn test_live_blacklist() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blacklist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["ads.example", "tracker.io"])))
        .mount(&server)
        .await;

    let blacklist = client_for(&server).get_blacklist().await;
    assert!(blacklist.is_live());
    assert_eq!(blacklist.into_inner(), vec!["ads.example", "tracker.io"]);
}

#[tokio::test]
async fn test_add_blacklist_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/blacklist"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"host": "x.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["x.com"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/blacklist"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.add_blacklist("x.com").await);
    assert!(!client.add_blacklist("x.com").await);
}

#[tokio::test]
async fn test_remove_blacklist_sends_delete_with_host() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/blacklist"))
        .and(body_json(json!({"host": "tracker.io"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.remove_blacklist("tracker.io").await);
    // unmatched body falls through to wiremock's 404
    assert!(!client.remove_blacklist("other.io").await);
}

#[tokio::test]
async fn test_clear_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cache/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "cleared"})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client_for(&server).clear_cache().await);

    let offline = ApiClient::new(UNREACHABLE, None).unwrap();
    assert!(!offline.clear_cache().await);
}

#[tokio::test]
async fn test_cancel_before_response_leaves_view_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"timestamp": "t", "client": ["c"], "host": "h"}]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let view = LogsView::new(Arc::new(client_for(&server)), 50);
    let handle = view.start(Duration::from_secs(3));

    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.cancel();
    handle.shutdown().await;

    let state = view.state();
    assert!(state.updated_at.is_none());
    assert!(state.data.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_views_poll_redundantly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_metrics()))
        .mount(&server)
        .await;

    let client: Arc<dyn DataSource> = Arc::new(client_for(&server));
    let first = RealTimeView::new(Arc::clone(&client));
    let second = RealTimeView::new(Arc::clone(&client));

    let handles = vec![
        first.start(Duration::from_secs(30)),
        second.start(Duration::from_secs(30)),
    ];

    for _ in 0..50 {
        if first.state().updated_at.is_some() && second.state().updated_at.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for handle in handles {
        handle.shutdown().await;
    }

    assert!(first.state().live);
    assert_eq!(second.state().data.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
