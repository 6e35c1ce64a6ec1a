//! In-memory transport shared by unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::TransportError;

use super::{HttpRequest, HttpResponse, HttpTransport};

/// Records requests and replays canned results in order.
pub(crate) struct ScriptedTransport {
    replies: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(mut replies: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop()
            .expect("unexpected extra request")
    }
}

pub(crate) fn respond(status: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        headers: HashMap::new(),
        body: body.as_bytes().to_vec(),
    })
}

pub(crate) fn ok(body: &str) -> Result<HttpResponse, TransportError> {
    respond(200, body)
}

pub(crate) fn chat_reply(text: &str) -> Result<HttpResponse, TransportError> {
    let body = serde_json::json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
    });
    ok(&body.to_string())
}
