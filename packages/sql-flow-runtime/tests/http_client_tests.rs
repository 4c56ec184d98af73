//! HostClient against a stub document API served by hyper.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use sql_flow_core::config::HostConfig;
use sql_flow_runtime::error::HostError;
use sql_flow_runtime::host::{BulkColumns, QueryEndpoint, RecordWriter, ResultRow, TableWriter};
use sql_flow_runtime::http::HostClient;

/// Requests seen by the stub: method, path and query, body.
type Seen = Arc<Mutex<Vec<(String, String, String)>>>;

async fn handle(
    req: Request<IncomingBody>,
    seen: Seen,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().to_string();
    let uri = req.uri().to_string();
    let xhr = req.headers().contains_key("x-requested-with");
    let body = match req.into_body().collect().await {
        Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
        Err(_) => String::new(),
    };
    seen.lock().push((method.clone(), uri.clone(), body));

    let path = uri.split('?').next().unwrap_or_default().to_string();
    let (status, payload) = match (method.as_str(), path.as_str()) {
        ("GET", "/api/docs/d1/sql") if !xhr => (400, json!({"error": "missing header"})),
        ("GET", "/api/docs/d1/sql") if uri.contains("bad") => {
            (400, json!({"error": "SQLITE_ERROR: no such table: bad"}))
        }
        ("GET", "/api/docs/d1/sql") if uri.contains("garbled") => {
            return Ok(reply(200, "<html>maintenance</html>".to_string()));
        }
        ("GET", "/api/docs/d1/sql") if uri.contains("crash") => {
            (500, json!({"detail": "internal failure"}))
        }
        ("GET", "/api/docs/d1/sql") if uri.contains("slow") => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            (200, json!({"records": []}))
        }
        ("GET", "/api/docs/d1/sql") => (
            200,
            json!({"records": [{"fields": {"amount": 5}}, {"fields": {"amount": 7}}]}),
        ),
        ("GET", "/api/docs/d1/tables") => {
            (200, json!({"tables": [{"id": "Orders"}, {"id": "Out"}]}))
        }
        ("GET", "/api/docs/d1/tables/Requests/records") => (
            200,
            json!({"records": [
                {"id": 1, "fields": {"RequestName": "Daily", "sqlField": "SELECT 1"}}
            ]}),
        ),
        ("GET", "/api/docs/d1/tables/Odd%23Name%3F/records") => (200, json!({"records": []})),
        ("POST", "/api/docs/d1/apply") => (200, json!({"actionNum": 1})),
        ("POST", "/api/docs/locked/apply") => {
            return Ok(reply(403, "document is read-only".to_string()));
        }
        _ => (404, json!({"error": "not found"})),
    };
    Ok(reply(status, payload.to_string()))
}

fn reply(status: u16, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

async fn serve() -> (SocketAddr, Seen) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: Seen = Arc::default();
    let shared = seen.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let seen = shared.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req| handle(req, seen.clone()));
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
    (addr, seen)
}

fn client(addr: SocketAddr) -> HostClient {
    client_for(addr, "d1", 5000)
}

fn client_for(addr: SocketAddr, doc: &str, request_timeout_ms: u64) -> HostClient {
    let config = HostConfig {
        base_url: format!("http://{}/api/docs/{}/", addr, doc),
        token: Some("secret".to_string()),
        request_timeout_ms,
        ..Default::default()
    };
    HostClient::new(&config).unwrap()
}

#[tokio::test]
async fn sql_query_round_trip() -> anyhow::Result<()> {
    let (addr, seen) = serve().await;
    let client = client(addr);

    let response = client.run_sql("SELECT amount FROM orders").await?;
    assert_eq!(response.error, None);
    assert_eq!(response.records.len(), 2);
    assert_eq!(response.records[1].fields["amount"], json!(7));

    let (method, uri, _) = seen.lock()[0].clone();
    assert_eq!(method, "GET");
    assert!(uri.starts_with("/api/docs/d1/sql?q=SELECT"));
    assert!(uri.ends_with("auth=secret"));
    Ok(())
}

#[tokio::test]
async fn sql_error_body_is_returned() -> anyhow::Result<()> {
    let (addr, _) = serve().await;

    let response = client(addr).run_sql("SELECT * FROM bad").await?;
    assert_eq!(response.error.as_deref(), Some("SQLITE_ERROR: no such table: bad"));
    Ok(())
}

#[tokio::test]
async fn replace_posts_user_action() -> anyhow::Result<()> {
    let (addr, seen) = serve().await;
    let rows: Vec<ResultRow> = vec![serde_json::from_value(json!({"fields": {"n": 1}}))?];

    client(addr)
        .replace_table_data("Out", BulkColumns::from_rows(&rows))
        .await?;

    let (method, uri, body) = seen.lock()[0].clone();
    assert_eq!(method, "POST");
    assert_eq!(uri, "/api/docs/d1/apply?auth=secret");
    let body: Value = serde_json::from_str(&body)?;
    assert_eq!(body, json!([["ReplaceTableData", "Out", [1], {"n": [1]}]]));
    Ok(())
}

#[tokio::test]
async fn tables_and_records() -> anyhow::Result<()> {
    let (addr, _) = serve().await;
    let client = client(addr);

    let tables = client.list_tables().await?;
    assert_eq!(tables, vec!["Orders".to_string(), "Out".to_string()]);

    let records = client.fetch_records("Requests").await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields["RequestName"], json!("Daily"));
    Ok(())
}

#[tokio::test]
async fn error_status_and_missing_token() {
    let (addr, _) = serve().await;

    let result = client(addr).fetch_records("Missing").await;
    assert!(matches!(result, Err(HostError::Status { status: 404, .. })));

    let anonymous = HostClient::new(&HostConfig {
        base_url: format!("http://{}/api/docs/d1", addr),
        ..Default::default()
    })
    .unwrap();
    assert!(matches!(anonymous.list_tables().await, Err(HostError::Token(_))));
}

#[tokio::test]
async fn sql_body_that_is_not_json() {
    let (addr, _) = serve().await;

    let result = client(addr).run_sql("SELECT garbled").await;
    assert!(matches!(result, Err(HostError::Decode(_))));
}

#[tokio::test]
async fn sql_failure_status_without_error_field() {
    let (addr, _) = serve().await;

    match client(addr).run_sql("SELECT crash").await {
        Err(HostError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("internal failure"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn rejected_apply_is_a_status_error() -> anyhow::Result<()> {
    let (addr, seen) = serve().await;
    let client = client_for(addr, "locked", 5000);
    let rows: Vec<ResultRow> = vec![serde_json::from_value(json!({"fields": {"n": 1}}))?];

    let replaced = client
        .replace_table_data("Out", BulkColumns::from_rows(&rows))
        .await;
    match replaced {
        Err(HostError::Status { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "document is read-only");
        }
        other => panic!("expected status error, got {:?}", other),
    }

    let updated = client.update_record("Requests", 4, serde_json::Map::new()).await;
    assert!(matches!(updated, Err(HostError::Status { status: 403, .. })));
    assert_eq!(seen.lock().len(), 2);
    Ok(())
}

#[tokio::test]
async fn slow_host_times_out() {
    let (addr, _) = serve().await;

    let result = client_for(addr, "d1", 50).run_sql("SELECT slow").await;
    assert!(matches!(result, Err(HostError::Transport(_))));
}

#[tokio::test]
async fn table_name_is_one_path_segment() -> anyhow::Result<()> {
    let (addr, seen) = serve().await;

    let records = client(addr).fetch_records("Odd#Name?").await?;
    assert!(records.is_empty());

    let (_, uri, _) = seen.lock()[0].clone();
    assert_eq!(uri, "/api/docs/d1/tables/Odd%23Name%3F/records?auth=secret");
    Ok(())
}
