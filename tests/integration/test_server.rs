//! In-process HTTP server standing in for the registration service
//!
//! Binds an axum router to a random port on localhost, records every form it
//! receives and answers through a caller-supplied handler.

use axum::extract::{Form as FormBody, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub type Form = HashMap<String, String>;
pub type Handler = Arc<dyn Fn(&Form) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct ServerState {
    handler: Handler,
    requests: Arc<Mutex<Vec<Form>>>,
}

pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Form>>>,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server answering every request through `handler`.
    pub async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Failed to get local address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let router = Router::new()
            .route("/api", post(register))
            .with_state(ServerState {
                handler,
                requests: requests.clone(),
            });
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Server that always answers with the same status and body.
    pub async fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(Arc::new(move |_| (status, body.clone()))).await
    }

    /// Server that behaves like the real service using the given field names.
    pub async fn registry(digest_field: &'static str, known_field: &'static str) -> Self {
        Self::start(registry_handler(digest_field, known_field, None)).await
    }

    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<Form> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Stateful handler: remembers digests, optionally checks the secret word.
pub fn registry_handler(
    digest_field: &'static str,
    known_field: &'static str,
    secret: Option<&'static str>,
) -> Handler {
    let known: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
    Arc::new(move |form: &Form| {
        let digest = match form.get(digest_field) {
            Some(d) if d.len() == 64 => d.to_lowercase(),
            _ => {
                return (
                    400,
                    r#"{"error":"baddigest","message":"Digest is not a SHA-256 hex string"}"#
                        .to_string(),
                )
            }
        };
        if let Some(expected) = secret {
            if form.get("secretword").map(String::as_str) != Some(expected) {
                return (
                    400,
                    r#"{"error":"badsecret","message":"Secret word does not match"}"#.to_string(),
                );
            }
        }
        let previously = !known.lock().insert(digest.clone());
        let body = format!(
            r#"{{"{}":"{}","registered":"2011-03-08T16:32:49Z","currenttime":"2011-03-09T10:00:00Z","{}":{}}}"#,
            digest_field, digest, known_field, previously
        );
        (200, body)
    })
}

async fn register(
    State(state): State<ServerState>,
    FormBody(form): FormBody<Form>,
) -> impl IntoResponse {
    state.requests.lock().push(form.clone());
    let (status, body) = (state.handler)(&form);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}
