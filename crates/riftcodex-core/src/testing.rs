//! Stub transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{RawResponse, RemoteFetcher, TransportError};

#[derive(Debug, Clone)]
enum Route {
    Respond(RawResponse),
    Fail(String),
}

/// Route table keyed by exact path. Unknown paths answer 404.
///
/// Every call yields to the runtime once before answering so concurrent
/// callers actually interleave.
#[derive(Debug, Default)]
pub struct StubFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, path: &str, body: &str) -> Self {
        self.respond(path, RawResponse::ok(body));
        self
    }

    pub fn respond(&self, path: &str, response: RawResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Respond(response));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), Route::Fail(message.to_string()));
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl RemoteFetcher for StubFetcher {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(path.to_string());
        tokio::task::yield_now().await;

        let route = self.routes.lock().unwrap().get(path).cloned();
        match route {
            Some(Route::Respond(response)) => Ok(response),
            Some(Route::Fail(message)) => Err(TransportError::Other(message)),
            None => Ok(RawResponse::new(404, "not found")),
        }
    }
}
