//! Report API client tests against a local stub server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use raidnight_core::{FetchError, ReportSource, ScoreSource, TableCategory};
use raidnight_wcl::{PageSource, RetryPolicy, ScorePageScraper, WclClient, WclConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves canned responses in order, one connection each, and records the
/// request lines it saw.
struct Stub {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Stub {
    async fn start(responses: Vec<(u16, String)>) -> Stub {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = vec![0u8; 16 * 1024];
                let mut read = 0;
                loop {
                    let n = sock.read(&mut buf[read..]).await.unwrap();
                    read += n;
                    if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]).to_string();
                log.lock()
                    .unwrap()
                    .push(head.lines().next().unwrap_or_default().to_string());

                let resp = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                sock.write_all(resp.as_bytes()).await.unwrap();
                let _ = sock.shutdown().await;
            }
        });

        Stub { addr, requests }
    }

    fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff_base_ms: 1,
        ..RetryPolicy::default()
    }
}

fn client(stub: &Stub, max_retries: u32) -> WclClient {
    WclClient::new(
        WclConfig::new("k3y")
            .with_base_url(&stub.base_url())
            .with_timeout_secs(5)
            .with_retry(fast_retry(max_retries)),
    )
    .unwrap()
}

const FIGHTS: &str = r#"{
    "start": 1515625200000,
    "end": 1515636000000,
    "zone": 17,
    "fights": [
        {"id": 3, "name": "Aggramar", "difficulty": 4, "start_time": 300000, "end_time": 600000, "boss": 2063, "kill": true}
    ]
}"#;

#[tokio::test]
async fn fights_are_fetched_after_server_errors() {
    let stub = Stub::start(vec![
        (503, "{}".to_string()),
        (502, "{}".to_string()),
        (200, FIGHTS.to_string()),
    ])
    .await;

    let fights = client(&stub, 5).fetch_fights("aBcD1234").await.unwrap();

    assert_eq!(fights.zone, 17);
    assert_eq!(fights.fights.len(), 1);
    assert_eq!(fights.highest_tier(), 4);

    let requests = stub.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[0],
        "GET /v1/report/fights/aBcD1234?api_key=k3y HTTP/1.1"
    );
}

#[tokio::test]
async fn table_request_carries_window() {
    let body = r#"{"totalTime": 300000, "entries": [{"name": "Alpha", "total": 312000000}]}"#;
    let stub = Stub::start(vec![(200, body.to_string())]).await;

    let table = client(&stub, 0)
        .fetch_table(TableCategory::Healing, "aBcD1234", 300_000, 600_000)
        .await
        .unwrap();

    assert_eq!(table.total_time, 300_000);
    assert_eq!(table.entry("Alpha").unwrap().total_output(), 312_000_000.0);
    assert_eq!(
        stub.requests()[0],
        "GET /v1/report/tables/healing/aBcD1234?start=300000&end=600000&api_key=k3y HTTP/1.1"
    );
}

#[tokio::test]
async fn not_found_is_permanent_and_not_retried() {
    let stub = Stub::start(vec![(404, "{}".to_string()), (200, FIGHTS.to_string())]).await;

    let err = client(&stub, 5).fetch_fights("missing").await.unwrap_err();

    assert!(!err.is_transient());
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn exhausted_retries_are_transient() {
    let stub = Stub::start(vec![
        (500, "{}".to_string()),
        (500, "{}".to_string()),
        (500, "{}".to_string()),
    ])
    .await;

    let err = client(&stub, 2)
        .fetch_table(TableCategory::Deaths, "aBcD1234", 0, 1)
        .await
        .unwrap_err();

    match err {
        FetchError::Transient {
            attempts, reason, ..
        } => {
            assert_eq!(attempts, 3);
            assert!(reason.contains("HTTP 500"));
            assert!(!reason.contains("k3y"));
        }
        other => panic!("expected transient error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_permanent() {
    let stub = Stub::start(vec![(200, "not json".to_string())]).await;

    let err = client(&stub, 5).fetch_fights("aBcD1234").await.unwrap_err();

    assert!(matches!(err, FetchError::Permanent { .. }));
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn score_pages_come_from_render_endpoint() {
    let html = r#"<table>
        <tr id="main-table-row-1">
          <td class="main-table-performance"><a>88</a></td>
          <td class="main-table-link"><img src="/img/specs/Hunter-Marksmanship.jpg"><a>Alpha</a></td>
          <td class="main-table-ilvl-performance"><a>93*</a></td>
        </tr>
      </table>"#;
    let stub = Stub::start(vec![(503, String::new()), (200, html.to_string())]).await;

    let config = WclConfig::default()
        .with_score_page_url(&format!("http://{}/render/{{code}}/{{fight}}", stub.addr))
        .with_retry(fast_retry(3));
    let source = PageSource::from_config(&config, std::env::temp_dir());
    let scraper = ScorePageScraper::new(source, &config).unwrap();

    let sheet = scraper.fetch_scores("aBcD1234", 3).await.unwrap();

    assert_eq!(sheet["Alpha"].overall_score, 88);
    assert_eq!(sheet["Alpha"].gear_score, 93);
    assert_eq!(stub.requests()[1], "GET /render/aBcD1234/3 HTTP/1.1");
}
