//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use kb_gateway::config::GatewayConfig;
use kb_gateway::{HttpServer, Shutdown};

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
}

/// Requests received by a mock upstream, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<SeenRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<SeenRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.all().into_iter().map(|r| r.path).collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.all().iter().filter(|r| r.path == path).count()
    }
}

/// Start a programmable upstream on an ephemeral port.
///
/// `f` receives the request path and returns `(status, json body)`.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, RequestLog)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = RequestLog::default();
    let f = Arc::new(f);
    let seen = log.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        seen.0.lock().unwrap().push(request.clone());

                        let (status, body) = f(request.path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            422 => "422 Unprocessable Entity",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, log)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let mut lines = head.split("\r\n");
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let authorization = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.trim().to_string());

    Some(SeenRequest { path, authorization })
}

/// Gateway config pointing at `upstream` with fast retries.
pub fn gateway_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.enabled = true;
    config.upstream.base_url = Some(format!("http://{upstream}"));
    config.upstream.api_key = Some("test-key".into());
    config.upstream.request_timeout_secs = 2;
    for retry in [&mut config.retries.status, &mut config.retries.content] {
        retry.initial_delay_ms = 10;
        retry.max_delay_ms = 40;
    }
    config
}

/// A running gateway and its shutdown handle.
pub struct Gateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("Gateway unreachable")
    }

    pub async fn get_as(&self, path: &str, client_ip: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("x-forwarded-for", client_ip)
            .send()
            .await
            .expect("Gateway unreachable")
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> Gateway {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    Gateway {
        addr,
        shutdown,
        client,
    }
}
