//! Asynchronous HTTP client with a composable middleware pipeline.
//!
//! A [`Client`] joins request paths to a base URL, prepares bodies and
//! headers, and dispatches through a [`HandlerStack`] of middleware down to
//! a [`Transport`] executor. Requests can be sent synchronously, started in
//! the background through [`Promise`] handles, or fanned out in batches
//! with an optional concurrency limit.
//!
//! ```no_run
//! use sling::{Client, RequestOptions, RetryMiddleware, TimeoutMiddleware};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), sling::ClientError> {
//! let client = Client::builder()
//!     .base_url("https://api.example.com")
//!     .middleware(TimeoutMiddleware::new(Duration::from_secs(10)))
//!     .middleware(RetryMiddleware::new(3))
//!     .build()?;
//!
//! let response = client.get("/users/42", RequestOptions::new()).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod body;
pub mod client;
pub mod concurrent;
pub mod error;
pub mod middleware;
pub mod promise;
pub mod transport;

pub use body::MultipartForm;
pub use client::{Auth, Client, ClientBuilder, ClientConfig, RequestOptions};
pub use concurrent::{ConcurrentRequest, ConcurrentResult, wait_all};
pub use error::{BodyError, BuildError, ClientError, ClientResult};
pub use middleware::{
    Backoff, ExponentialBackoff, HandlerStack, LoggingMiddleware, Middleware, Next,
    RetryMiddleware, TimeoutMiddleware,
};
pub use promise::Promise;
pub use transport::{Request, ReqwestTransport, Response, Transport};
