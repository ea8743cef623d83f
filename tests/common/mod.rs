//! In-process fake servers and mock pipeline stages

#![allow(dead_code)]

use async_trait::async_trait;
use proxy_scraper::error::FetchError;
use proxy_scraper::{
    Anonymity, CandidateEndpoint, FetchList, FetchReport, ProxyKind, ProxySource, TimeoutBound,
    VerifiedProxy, VerifyProxy,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn read_request_head(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

async fn answer_http(mut stream: TcpStream, status: u16, body: &str) {
    read_request_head(&mut stream).await;
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_until_nul(stream: &mut TcpStream) -> std::io::Result<()> {
    while stream.read_u8().await? != 0 {}
    Ok(())
}

/// SOCKS4/4a CONNECT handshake, accepting any target
async fn accept_socks4(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut head = [0u8; 8];
    stream.read_exact(&mut head).await?;
    if head[0] != 4 || head[1] != 1 {
        return Err(std::io::ErrorKind::InvalidData.into());
    }
    read_until_nul(stream).await?;
    let ip = &head[4..8];
    if ip[..3] == [0, 0, 0] && ip[3] != 0 {
        read_until_nul(stream).await?;
    }
    stream.write_all(&[0, 0x5a, 0, 0, 0, 0, 0, 0]).await
}

/// SOCKS5 CONNECT handshake without authentication, accepting any target
async fn accept_socks5(stream: &mut TcpStream) -> std::io::Result<()> {
    let mut greeting = [0u8; 2];
    stream.read_exact(&mut greeting).await?;
    let mut methods = vec![0u8; greeting[1] as usize];
    stream.read_exact(&mut methods).await?;
    if greeting[0] != 5 || !methods.contains(&0) {
        return Err(std::io::ErrorKind::InvalidData.into());
    }
    stream.write_all(&[5, 0]).await?;

    let mut request = [0u8; 4];
    stream.read_exact(&mut request).await?;
    let addr_len = match request[3] {
        1 => 4,
        3 => stream.read_u8().await? as usize,
        4 => 16,
        _ => return Err(std::io::ErrorKind::InvalidData.into()),
    };
    let mut target = vec![0u8; addr_len + 2];
    stream.read_exact(&mut target).await?;
    stream.write_all(&[5, 0, 0, 1, 0, 0, 0, 0, 0, 0]).await
}

/// SOCKS relay that completes the handshake for any target and then answers
/// the tunnelled HTTP request itself with the given status and body.
pub async fn spawn_socks_server(kind: ProxyKind, status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let handshake = match kind {
                    ProxyKind::Socks4 => accept_socks4(&mut stream).await,
                    ProxyKind::Socks5 => accept_socks5(&mut stream).await,
                    ProxyKind::Http => Ok(()),
                };
                if handshake.is_ok() {
                    answer_http(stream, status, body).await;
                }
            });
        }
    });

    addr
}

/// Serve every request with the same status and body. Works both as a list
/// provider and as an HTTP proxy, since a proxy receives plain requests too.
pub async fn spawn_http_server(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(answer_http(stream, status, body));
        }
    });

    addr
}

/// Like `spawn_http_server`, but the body is built at runtime
pub async fn spawn_http_server_owned(status: u16, body: String) -> SocketAddr {
    spawn_http_server(status, Box::leak(body.into_boxed_str())).await
}

/// Accept connections and never answer
pub async fn spawn_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(stream);
            });
        }
    });

    addr
}

/// Address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn endpoint(s: &str) -> CandidateEndpoint {
    CandidateEndpoint::parse(s).unwrap()
}

/// Fetcher answering from a fixed table keyed by source name.
/// `None` simulates a provider answering HTTP 500.
#[derive(Default)]
pub struct MockFetcher {
    lists: HashMap<String, Option<Vec<&'static str>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(mut self, source: &str, entries: Vec<&'static str>) -> Self {
        self.lists.insert(source.to_string(), Some(entries));
        self
    }

    pub fn with_failure(mut self, source: &str) -> Self {
        self.lists.insert(source.to_string(), None);
        self
    }
}

#[async_trait]
impl FetchList for MockFetcher {
    async fn fetch(&self, source: &ProxySource, _bound: TimeoutBound) -> FetchReport {
        match self.lists.get(&source.name) {
            Some(Some(entries)) => FetchReport::success(
                source.name.clone(),
                entries.iter().filter_map(|e| CandidateEndpoint::parse(e)).collect(),
            ),
            _ => FetchReport::failure(source.name.clone(), FetchError::Status { status: 500 }),
        }
    }
}

/// Verifier confirming only the endpoints it was given, recording every checked endpoint
#[derive(Default)]
pub struct MockVerifier {
    working: HashMap<CandidateEndpoint, VerifiedProxy>,
    probed: Mutex<Vec<CandidateEndpoint>>,
}

impl MockVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working(mut self, endpoint_str: &str, country: &str, anonymity: Anonymity) -> Self {
        let ep = endpoint(endpoint_str);
        self.working.insert(
            ep.clone(),
            VerifiedProxy::new(ep, country.to_string(), 0.1, anonymity),
        );
        self
    }

    pub fn probed(&self) -> Vec<CandidateEndpoint> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerifyProxy for MockVerifier {
    async fn verify(&self, endpoint: &CandidateEndpoint, _kind: ProxyKind) -> Option<VerifiedProxy> {
        self.probed.lock().unwrap().push(endpoint.clone());
        self.working.get(endpoint).cloned()
    }
}

/// Verifier that panics on every verification
pub struct PanickingVerifier;

#[async_trait]
impl VerifyProxy for PanickingVerifier {
    async fn verify(&self, _endpoint: &CandidateEndpoint, _kind: ProxyKind) -> Option<VerifiedProxy> {
        panic!("verifier crashed");
    }
}
