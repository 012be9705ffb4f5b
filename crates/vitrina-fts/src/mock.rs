//! Mock text backend for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use vitrina_catalog::Product;
use vitrina_core::{Error, Result};

use crate::backend::TextBackend;

/// Mock text backend serving canned products.
///
/// Search matches case-insensitively on substrings of the item name,
/// completion on prefixes, so tests get plausible narrowing behavior
/// without a live service. Failure injection covers the timeout and
/// transport paths.
#[derive(Clone)]
pub struct MockTextBackend {
    state: Arc<Mutex<MockTextState>>,
}

struct MockTextState {
    products: Vec<Product>,
    failure: Option<InjectedFailure>,
    queries: Vec<String>,
}

enum InjectedFailure {
    Timeout,
    Transport(String),
}

impl MockTextBackend {
    /// Creates a mock serving the given products.
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockTextState {
                products,
                failure: None,
                queries: Vec::new(),
            })),
        }
    }

    /// Creates a mock where every call times out.
    pub fn failing_with_timeout() -> Self {
        Self::with_failure(InjectedFailure::Timeout)
    }

    /// Creates a mock where every call fails with a transport error.
    pub fn failing_with(message: impl Into<String>) -> Self {
        Self::with_failure(InjectedFailure::Transport(message.into()))
    }

    fn with_failure(failure: InjectedFailure) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockTextState {
                products: Vec::new(),
                failure: Some(failure),
                queries: Vec::new(),
            })),
        }
    }

    /// Queries received so far, in call order.
    pub async fn queries(&self) -> Vec<String> {
        self.state.lock().await.queries.clone()
    }

    async fn respond<F>(&self, query: &str, limit: usize, matches: F) -> Result<Vec<Product>>
    where
        F: Fn(&str, &str) -> bool,
    {
        let mut state = self.state.lock().await;
        state.queries.push(query.to_string());
        match &state.failure {
            Some(InjectedFailure::Timeout) => {
                Err(Error::timeout("mock text backend timed out"))
            }
            Some(InjectedFailure::Transport(message)) => {
                Err(Error::backend_transient(message.clone()))
            }
            None => {
                let needle = query.to_lowercase();
                let mut hits: Vec<Product> = state
                    .products
                    .iter()
                    .filter(|p| matches(&p.item_name.to_lowercase(), &needle))
                    .cloned()
                    .collect();
                hits.truncate(limit);
                Ok(hits)
            }
        }
    }
}

#[async_trait]
impl TextBackend for MockTextBackend {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>> {
        self.respond(query, limit, |name, needle| name.contains(needle))
            .await
    }

    async fn complete(&self, prefix: &str, limit: usize) -> Result<Vec<Product>> {
        self.respond(prefix, limit, |name, needle| name.starts_with(needle))
            .await
    }

    fn name(&self) -> &str {
        "mock-text"
    }
}
