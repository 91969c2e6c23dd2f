//! Asynchronous dispatch and concurrent fan-out on top of [`Client`].


use std::sync::Arc;

use futures_util::future::join_all;
use reqwest::Method;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::client::{Client, RequestOptions};
use crate::error::{ClientError, ClientResult};
use crate::promise::Promise;
use crate::transport::Response;

/// One request in a concurrent batch.
#[derive(Debug, Clone)]
pub struct ConcurrentRequest {
    pub method: Method,
    pub path: String,
    pub options: RequestOptions,
}

impl ConcurrentRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            options: RequestOptions::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Outcome of one batch entry, tagged with the index of the request that
/// produced it.
#[derive(Debug)]
pub struct ConcurrentResult {
    pub index: usize,
    pub outcome: ClientResult<Response>,
}

impl Client {
    /// Starts the request on a background task and returns a [`Promise`]
    /// settling with its outcome. Returns immediately.
    #[must_use]
    pub fn send_async(&self, method: Method, path: &str, options: RequestOptions) -> Promise {
        let promise = Promise::new();
        let settler = promise.clone();
        let client = self.clone();
        let path = path.to_owned();
        drop(tokio::spawn(async move {
            match client.request(method, &path, options).await {
                Ok(response) => settler.resolve(response),
                Err(err) => settler.reject(err),
            }
        }));
        promise
    }

    /// Starts a GET request without waiting for it.
    #[must_use]
    pub fn get_async(&self, path: &str, options: RequestOptions) -> Promise {
        self.send_async(Method::GET, path, options)
    }

    /// Starts a POST request without waiting for it.
    #[must_use]
    pub fn post_async(&self, path: &str, options: RequestOptions) -> Promise {
        self.send_async(Method::POST, path, options)
    }

    /// Starts a PUT request without waiting for it.
    #[must_use]
    pub fn put_async(&self, path: &str, options: RequestOptions) -> Promise {
        self.send_async(Method::PUT, path, options)
    }

    /// Starts a DELETE request without waiting for it.
    #[must_use]
    pub fn delete_async(&self, path: &str, options: RequestOptions) -> Promise {
        self.send_async(Method::DELETE, path, options)
    }

    /// Starts a PATCH request without waiting for it.
    #[must_use]
    pub fn patch_async(&self, path: &str, options: RequestOptions) -> Promise {
        self.send_async(Method::PATCH, path, options)
    }

    /// Runs all `requests` concurrently and waits for the full batch.
    ///
    /// Results keep the input order through their `index` field; one entry
    /// failing never disturbs the others.
    pub async fn send_concurrent(&self, requests: Vec<ConcurrentRequest>) -> Vec<ConcurrentResult> {
        self.send_batch(requests, None).await
    }

    /// Like [`Client::send_concurrent`], but admits at most `limit` requests
    /// to execution at once. A `limit` of zero is treated as one.
    pub async fn send_concurrent_with_limit(
        &self,
        requests: Vec<ConcurrentRequest>,
        limit: usize,
    ) -> Vec<ConcurrentResult> {
        let permits = limit.max(1);
        self.send_batch(requests, Some(Arc::new(Semaphore::new(permits))))
            .await
    }

    async fn send_batch(
        &self,
        requests: Vec<ConcurrentRequest>,
        gate: Option<Arc<Semaphore>>,
    ) -> Vec<ConcurrentResult> {
        debug!(
            total = requests.len(),
            limited = gate.is_some(),
            "dispatching batch"
        );

        let handles = requests
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let client = self.clone();
                let gate = gate.clone();
                tokio::spawn(async move {
                    let outcome = execute_entry(&client, entry, gate).await;
                    ConcurrentResult { index, outcome }
                })
            })
            .collect::<Vec<_>>();

        join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, joined)| match joined {
                Ok(result) => result,
                Err(err) => ConcurrentResult {
                    index,
                    outcome: Err(ClientError::TaskJoin {
                        reason: err.to_string(),
                    }),
                },
            })
            .collect()
    }
}

async fn execute_entry(
    client: &Client,
    entry: ConcurrentRequest,
    gate: Option<Arc<Semaphore>>,
) -> ClientResult<Response> {
    let _permit = match gate {
        Some(gate) => Some(
            gate.acquire_owned()
                .await
                .map_err(|_closed| ClientError::Cancelled)?,
        ),
        None => None,
    };
    client.request(entry.method, &entry.path, entry.options).await
}

/// Waits for every promise and returns their outcomes in input order.
pub async fn wait_all(promises: Vec<Promise>) -> Vec<ConcurrentResult> {
    join_all(
        promises
            .into_iter()
            .enumerate()
            .map(|(index, promise)| async move {
                ConcurrentResult {
                    index,
                    outcome: promise.wait().await,
                }
            }),
    )
    .await
}
