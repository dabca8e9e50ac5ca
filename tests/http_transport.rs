// Author: Jacques Murray

use monibot::{
    Api, CancellationToken, Config, Error, HttpTransport, Logger, MachineSample, MetricType,
    Request, Transport,
};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Collects debug lines so tests can inspect them
#[derive(Default)]
struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, args: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push(args.to_string());
    }
}

fn config(server: &MockServer) -> Config {
    Config::new("api-key-123")
        .with_base_url(server.uri())
        .with_user_agent("monibot/v1.2.3")
}

fn transport(server: &MockServer, logger: Arc<RecordingLogger>) -> HttpTransport {
    HttpTransport::new(&config(server), logger).unwrap()
}

fn api(server: &MockServer) -> Api {
    let config = config(server)
        .with_trials(3)
        .with_delay(Duration::ZERO);
    Api::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_get_sends_auth_headers_and_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ok"))
        .and(header("Authorization", "Bearer api-key-123"))
        .and(header("User-Agent", "monibot/v1.2.3"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let logger = Arc::new(RecordingLogger::default());
    let response = transport(&server, Arc::clone(&logger))
        .send(&Request::get("ok"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), b"ok");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].headers.get("content-type").is_none());
    assert_eq!(
        logger.lines(),
        vec![
            format!("GET {}/api/ok", server.uri()),
            "200 (2 bytes) ok".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_post_with_body_sets_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/metric/m1/inc"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("value=42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let logger = Arc::new(RecordingLogger::default());
    let response = transport(&server, Arc::clone(&logger))
        .send(&Request::post("metric/m1/inc", "value=42"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(logger.lines().contains(&"body=value=42".to_string()));
}

#[tokio::test]
async fn test_error_status_is_returned_as_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/500"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = transport(&server, Arc::default())
        .send(&Request::post("500", ""), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn test_long_body_is_truncated_in_log() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/watchdogs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("z".repeat(1000)))
        .mount(&server)
        .await;

    let logger = Arc::new(RecordingLogger::default());
    let response = transport(&server, Arc::clone(&logger))
        .send(&Request::get("watchdogs"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(response.body().len(), 1000);
    let last = logger.lines().pop().unwrap();
    assert_eq!(last, format!("200 (1000 bytes) {}...", "z".repeat(256)));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config::new("k").with_base_url(format!("http://{addr}"));
    let transport = HttpTransport::new(&config, Arc::new(monibot::DiscardLogger)).unwrap();

    let result = transport
        .send(&Request::get("ping"), &CancellationToken::new())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_malformed_url_is_transport_error() {
    let config = Config::new("k").with_base_url("not a url");
    let transport = HttpTransport::new(&config, Arc::new(monibot::DiscardLogger)).unwrap();

    let result = transport
        .send(&Request::get("ping"), &CancellationToken::new())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_cancel_aborts_in_flight_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = transport(&server, Arc::default())
        .send(&Request::get("slow"), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "cancelled");
}

#[tokio::test]
async fn test_api_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/watchdog/w1/heartbeat"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/watchdog/w1/heartbeat"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    api(&server)
        .post_watchdog_heartbeat("w1", &CancellationToken::new())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
    assert!(received.iter().all(|r| r.body.is_empty()));
}

#[tokio::test]
async fn test_api_does_not_retry_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string("401 - Unauthorized (invalid apiKey)"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = api(&server)
        .get_ping(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Client(_)));
    assert_eq!(
        err.to_string(),
        "status 401: 401 - Unauthorized (invalid apiKey)"
    );
}

#[tokio::test]
async fn test_api_reads_resources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/watchdogs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id":"w1","name":"Backup","intervalMillis":3600000}]"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/machine/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":"m1","name":"db01"}"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"id":"c1","name":"Signups","type":0},{"id":"g1","name":"Queue","type":1}]"#,
        ))
        .mount(&server)
        .await;

    let api = api(&server);
    let cancel = CancellationToken::new();

    let watchdogs = api.get_watchdogs(&cancel).await.unwrap();
    assert_eq!(watchdogs.len(), 1);
    assert_eq!(watchdogs[0].interval_millis, 3_600_000);

    let machine = api.get_machine("m1", &cancel).await.unwrap();
    assert_eq!(machine.name, "db01");

    let metrics = api.get_metrics(&cancel).await.unwrap();
    assert_eq!(metrics[1].metric_type, MetricType::Gauge);
}

#[tokio::test]
async fn test_api_lists_metrics_of_unknown_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"[{"id":"a","type":0},{"id":"b","type":3}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let metrics = api(&server)
        .get_metrics(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[1].metric_type, MetricType::Unknown(3));
}

#[tokio::test]
async fn test_api_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/metric/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let err = api(&server)
        .get_metric("x", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_api_write_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/machine/m1/sample"))
        .and(body_string(
            "tstamp=1700000000000&load1=0.100&load5=0.200&load15=0.300&cpu=10&mem=20&disk=30",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/metric/g1/set"))
        .and(body_string("value=-7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/metric/h1/values"))
        .and(body_string("values=1,2:2,9"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/watchdog/w1/reset"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let cancel = CancellationToken::new();
    let sample = MachineSample {
        tstamp: 1_700_000_000_000,
        load1: 0.1,
        load5: 0.2,
        load15: 0.3,
        cpu_percent: 10,
        mem_percent: 20,
        disk_percent: 30,
    };

    api.post_machine_sample("m1", &sample, &cancel).await.unwrap();
    api.post_metric_set("g1", -7, &cancel).await.unwrap();
    api.post_metric_values("h1", &[9, 2, 1, 2], &cancel).await.unwrap();
    api.post_watchdog_reset("w1", &cancel).await.unwrap();
}
