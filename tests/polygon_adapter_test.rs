//! Polygon adapter tests against a local HTTP server with canned responses.

mod common;

use common::*;
use goldenstop::adapters::polygon_adapter::{PolygonAdapter, PolygonConfig};
use goldenstop::domain::error::GoldenStopError;
use goldenstop::ports::data_port::DataPort;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

/// Serves each `(status line, body)` pair to one connection, in order.
fn serve(responses: Vec<(&'static str, &'static str)>) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = match listener.accept() {
                Ok(conn) => conn,
                Err(_) => return,
            };
            seen.lock().unwrap().push(read_head(&stream));

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    CannedServer { base_url, requests }
}

fn read_head(stream: &std::net::TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut head = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        head.push_str(&line);
    }
    head
}

/// The first connection gets headers and a truncated body, then nothing;
/// the second gets `body` in full.
fn serve_stalled_then(body: &'static str) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    thread::spawn(move || {
        let Ok((mut stalled, _)) = listener.accept() else {
            return;
        };
        seen.lock().unwrap().push(read_head(&stalled));
        let _ = stalled.write_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 4096\r\n\r\n{\"status\"",
        );
        let _ = stalled.flush();

        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };
        seen.lock().unwrap().push(read_head(&stream));
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();
        drop(stalled);
    });

    CannedServer { base_url, requests }
}

fn adapter(server: &CannedServer, max_retries: u32) -> PolygonAdapter {
    PolygonAdapter::new(PolygonConfig {
        base_url: server.base_url.clone(),
        api_key: Some("pk_test".into()),
        timeout: Duration::from_secs(5),
        max_retries,
        base_delay: Duration::ZERO,
    })
    .unwrap()
}

const AGGS_OK: &str = r#"{"ticker":"TSLA","status":"OK","resultsCount":2,"adjusted":true,"results":[
{"v":1000,"o":100.0,"c":102.0,"h":104.0,"l":99.0,"t":1704171600000},
{"v":1200,"o":102.0,"c":103.5,"h":105.0,"l":101.0,"t":1704258000000}]}"#;

#[test]
fn fetches_bars_with_bearer_auth() {
    let server = serve(vec![("200 OK", AGGS_OK)]);
    let bars = adapter(&server, 0)
        .fetch_daily_bars("TSLA", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].date, date(2024, 1, 2));
    assert_eq!(bars[1].close, 103.5);

    let requests = server.requests.lock().unwrap();
    let head = requests[0].to_lowercase();
    assert!(head.starts_with(
        "get /v2/aggs/ticker/tsla/range/1/day/2024-01-01/2024-01-31?adjusted=true&sort=asc&limit=50000"
    ));
    assert!(head.contains("authorization: bearer pk_test"));
}

#[test]
fn unauthorized_is_credentials_error_without_retry() {
    let server = serve(vec![(
        "401 Unauthorized",
        r#"{"status":"ERROR","error":"Unknown API Key"}"#,
    )]);
    let err = adapter(&server, 3)
        .fetch_daily_bars("TSLA", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap_err();

    assert!(matches!(err, GoldenStopError::Credentials { ref reason } if reason == "Unknown API Key"));
    assert_eq!(server.requests.lock().unwrap().len(), 1);
}

#[test]
fn not_found_is_symbol_not_found() {
    let server = serve(vec![("404 Not Found", r#"{"status":"NOT_FOUND"}"#)]);
    let err = adapter(&server, 0)
        .fetch_daily_bars("NOPE", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap_err();
    assert!(matches!(err, GoldenStopError::SymbolNotFound { ref symbol } if symbol == "NOPE"));
}

#[test]
fn rate_limit_is_retried() {
    let server = serve(vec![
        ("429 Too Many Requests", r#"{"status":"ERROR","error":"slow down"}"#),
        ("200 OK", AGGS_OK),
    ]);
    let bars = adapter(&server, 2)
        .fetch_daily_bars("TSLA", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(server.requests.lock().unwrap().len(), 2);
}

#[test]
fn server_errors_exhaust_retries() {
    let server = serve(vec![
        ("503 Service Unavailable", "{}"),
        ("503 Service Unavailable", "{}"),
    ]);
    let err = adapter(&server, 1)
        .fetch_daily_bars("TSLA", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap_err();

    assert!(matches!(err, GoldenStopError::DataSource { .. }));
    assert_eq!(server.requests.lock().unwrap().len(), 2);
}

#[test]
fn display_name_from_ticker_details() {
    let server = serve(vec![(
        "200 OK",
        r#"{"status":"OK","results":{"ticker":"TSLA","name":"Tesla, Inc."}}"#,
    )]);
    let name = adapter(&server, 0).fetch_display_name("TSLA").unwrap();
    assert_eq!(name.as_deref(), Some("Tesla, Inc."));

    let requests = server.requests.lock().unwrap();
    assert!(requests[0].starts_with("GET /v3/reference/tickers/TSLA"));
}

#[test]
fn missing_ticker_details_is_no_name() {
    let server = serve(vec![("404 Not Found", "{}")]);
    assert_eq!(adapter(&server, 0).fetch_display_name("TSLA").unwrap(), None);
}

#[test]
fn body_read_timeout_is_retried() {
    let server = serve_stalled_then(AGGS_OK);
    let adapter = PolygonAdapter::new(PolygonConfig {
        base_url: server.base_url.clone(),
        api_key: Some("pk_test".into()),
        timeout: Duration::from_millis(500),
        max_retries: 1,
        base_delay: Duration::ZERO,
    })
    .unwrap();

    let bars = adapter
        .fetch_daily_bars("TSLA", date(2024, 1, 1), date(2024, 1, 31))
        .unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(server.requests.lock().unwrap().len(), 2);
}
