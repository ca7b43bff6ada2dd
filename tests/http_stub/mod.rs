#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

/// Canned response for one `METHOD path?query`.
#[derive(Debug, Clone)]
pub struct StubRoute {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl StubRoute {
    pub fn csv(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/csv",
            body: body.to_owned(),
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: value.to_string(),
        }
    }

    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct HttpStub {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl HttpStub {
    /// Serves `routes`, keyed by `"GET /path?query"`; anything else is 404.
    pub fn spawn(routes: HashMap<String, StubRoute>) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start http stub server");
        let base_url = format!("http://{}", server.server_addr());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_server = Arc::clone(&seen);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let method = request.method().to_string();
                let url = request.url().to_owned();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_owned());
                seen_by_server.lock().unwrap().push(SeenRequest {
                    method: method.clone(),
                    url: url.clone(),
                    authorization,
                    body,
                });

                let route = routes
                    .get(&format!("{method} {url}"))
                    .cloned()
                    .unwrap_or_else(|| StubRoute::error(404, "not found"));
                let content_type = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    route.content_type.as_bytes(),
                )
                .expect("content-type header");
                let _ = request.respond(
                    tiny_http::Response::from_string(route.body)
                        .with_status_code(route.status)
                        .with_header(content_type),
                );
            }
        });

        Self {
            base_url,
            seen,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for HttpStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
