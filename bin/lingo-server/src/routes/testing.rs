//! Router fixtures backed by a scripted upstream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use lingo_llm::{
    CompletionRequest, CompletionTransport, RawResponse, Sleeper, TransportError, UpstreamClient,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::Config;
use crate::middleware::session::X_SESSION_ID;
use crate::state::AppState;

type Scripted = Result<RawResponse, TransportError>;

pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Scripted>>,
    sent: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedTransport {
    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<CompletionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionTransport for ScriptedTransport {
    async fn send(&self, request: &CompletionRequest, _timeout: Duration) -> Scripted {
        self.sent.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("upstream called more often than scripted")
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _delay: Duration) {}
}

pub fn reply(content: &str) -> Scripted {
    Ok(RawResponse {
        status: 200,
        body: json!({ "choices": [{ "message": { "content": content } }] }).to_string(),
    })
}

pub fn status(code: u16) -> Scripted {
    Ok(RawResponse {
        status: code,
        body: String::new(),
    })
}

pub fn config(enable_docs: bool) -> Config {
    Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("test-key".to_owned()),
        "LINGO_ENABLE_DOCS" => Some(enable_docs.to_string()),
        _ => None,
    })
    .unwrap()
}

pub struct Harness {
    pub app: Router,
    pub state: Arc<AppState>,
    pub upstream: Arc<ScriptedTransport>,
}

pub fn harness(outcomes: impl IntoIterator<Item = Scripted>) -> Harness {
    let upstream = Arc::new(ScriptedTransport {
        outcomes: Mutex::new(outcomes.into_iter().collect()),
        sent: Mutex::default(),
    });
    let client = UpstreamClient::new(upstream.clone(), "test-model").with_sleeper(Arc::new(NoSleep));
    let state = Arc::new(AppState::new(config(true), client));
    Harness {
        app: super::build(state.clone()),
        state,
        upstream,
    }
}

pub fn post_json(uri: &str, session: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(X_SESSION_ID, session)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str, session: &str) -> Request<Body> {
    Request::get(uri)
        .header(X_SESSION_ID, session)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send `req` through `app` and return the status and JSON body.
pub async fn call(app: &Router, req: Request<Body>) -> (u16, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status().as_u16();
    (status, body_json(response).await)
}
