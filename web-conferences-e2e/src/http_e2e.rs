// https://github.com/hyperium/hyper/blob/master/examples/client.rs

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt as _, Empty};
use hyper::header::{AUTHORIZATION, HOST};
use hyper::{HeaderMap, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use web_conferences_backend::error::AppError;
use web_conferences_backend::plugins::PluginRegistry;
use web_conferences_backend::{app, serve, AppState};
use web_conferences_config::ApiConfig;
use web_conferences_database::ConferenceStore;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// The api listening on an ephemeral port of localhost.
pub struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::result::Result<(), AppError>>,
}

impl TestServer {
    pub async fn start(store: Arc<dyn ConferenceStore>, api: ApiConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let app = app(AppState::new(store, PluginRegistry::builtin(), api));

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, app, async move {
            // a dropped sender shuts down as well
            let _ = shutdown_rx.await;
        }));
        Ok(Self {
            addr,
            shutdown,
            handle,
        })
    }

    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends a `GET` over a fresh HTTP/1 connection.
    pub async fn get(&self, path_and_query: &str, token: Option<&str>) -> Result<Response> {
        let stream = TcpStream::connect(self.addr).await?;
        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!("connection failed: {err}");
            }
        });

        let mut request = Request::get(path_and_query).header(HOST, self.addr.to_string());
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = sender
            .send_request(request.body(Empty::<Bytes>::new())?)
            .await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        debug!("GET {path_and_query} -> {}", parts.status);

        Ok(Response {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Shuts the server down gracefully and reports how serving ended.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown.send(());
        self.handle.await?.map_err(|err| err.to_string())?;
        Ok(())
    }
}
