mod support;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use interview_bot::adapter::inbound::web;
use interview_bot::error::{Error, Result};
use interview_bot::port::HealthProbe;

use support::TempDb;

const HEALTHY: u8 = 0;
const DB_DOWN: u8 = 1;
const BROKEN: u8 = 2;

/// Probe whose answer can be switched at runtime.
#[derive(Default)]
struct SwitchProbe(AtomicU8);

impl SwitchProbe {
    fn set(&self, state: u8) {
        self.0.store(state, Ordering::SeqCst);
    }
}

impl HealthProbe for SwitchProbe {
    async fn ping(&self) -> Result<()> {
        match self.0.load(Ordering::SeqCst) {
            HEALTHY => Ok(()),
            DB_DOWN => Err(Error::Database("disk I/O error".into())),
            _ => Err(Error::Parse("unexpected".into())),
        }
    }
}

struct Server {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<Result<()>>,
}

impl Server {
    async fn start<P: HealthProbe + 'static>(probe: Arc<P>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(web::serve(listener, probe, rx));
        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn stop(self) {
        self.shutdown.send(true).unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

async fn get(url: &str) -> (StatusCode, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn root_reports_alive() {
    let server = Server::start(Arc::new(SwitchProbe::default())).await;

    let (status, body) = get(&server.url("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "I am alive");

    server.stop().await;
}

#[tokio::test]
async fn health_follows_the_probe() {
    let probe = Arc::new(SwitchProbe::default());
    let server = Server::start(Arc::clone(&probe)).await;

    let (status, body) = get(&server.url("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    probe.set(DB_DOWN);
    let (status, body) = get(&server.url("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert!(body["detail"].as_str().unwrap().contains("disk I/O error"));

    probe.set(BROKEN);
    let (status, body) = get(&server.url("/health")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("An error occurred:"));

    server.stop().await;
}

#[tokio::test]
async fn health_against_a_real_database() {
    let db = TempDb::create();
    let server = Server::start(db.repo()).await;

    let (status, body) = get(&server.url("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    server.stop().await;
}

#[tokio::test]
async fn cors_is_open() {
    let server = Server::start(Arc::new(SwitchProbe::default())).await;

    let response = reqwest::Client::new()
        .get(server.url("/"))
        .header("Origin", "https://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    server.stop().await;
}
