//! Blocking HTTP client backed by `ureq`.

use cardsync_engine::{HttpClient, HttpRequest, HttpResponse, Method};
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Largest response body read into memory.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// [`HttpClient`] over a shared `ureq` agent.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl HttpClient for UreqClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let mut call = match request.method {
            Method::Get => self.agent.get(&request.url),
            Method::Post => self.agent.post(&request.url),
            Method::Delete => self.agent.delete(&request.url),
        };
        for (name, value) in &request.query {
            call = call.query(name, value);
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        debug!(method = ?request.method, url = %request.url, "sending request");
        let result = match &request.body {
            Some(body) => call.send_bytes(body),
            None => call.call(),
        };

        // Error statuses still carry a response for the service to map.
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => return Err(transport.to_string()),
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| format!("failed to read response body: {}", e))?;
        Ok(HttpResponse { status, body })
    }
}
