//! Client construction and request dispatch.
mod options;


pub use options::{Auth, RequestOptions};

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use reqwest::Method;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::body::prepare_body;
use crate::error::{BuildError, ClientResult};
use crate::middleware::{HandlerStack, Middleware};
use crate::transport::{ReqwestTransport, Request, Response, Transport};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("sling/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable defaults attached to a client at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Option<Url>,
    pub timeout: Duration,
    pub auth: Option<Auth>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            auth: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// HTTP client dispatching requests through the middleware stack to a
/// transport executor.
///
/// Cheap to clone; clones share the configuration, stack, and transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    default_headers: HeaderMap,
    stack: HandlerStack,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Client")
            .field("config", &self.inner.config)
            .field("middlewares", &self.inner.stack.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`]; validation happens in [`ClientBuilder::build`].
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    auth: Option<Auth>,
    user_agent: Option<String>,
    stack: HandlerStack,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Base URL that relative request paths are joined to.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Default header attached to every request; per-request headers
    /// override it.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Default timeout for requests that carry none of their own.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Default credentials; per-request auth overrides them.
    #[must_use]
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Appends a middleware; the first pushed is the outermost wrapper.
    #[must_use]
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.stack.push(middleware);
        self
    }

    /// Replaces the reqwest-backed transport, e.g. with a stub.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns a build error when the base URL or a default header is
    /// invalid, or when the underlying HTTP client cannot be constructed.
    pub fn build(self) -> ClientResult<Client> {
        let base_url = match self.base_url {
            Some(raw) => Some(Url::parse(&raw).map_err(|err| BuildError::InvalidUrl {
                url: raw,
                source: err,
            })?),
            None => None,
        };

        let config = ClientConfig {
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            auth: self.auth,
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        };

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            insert_header(&mut default_headers, name, value)?;
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let client = reqwest::Client::builder()
                    .timeout(config.timeout)
                    .user_agent(&config.user_agent)
                    .build()
                    .map_err(|err| BuildError::BuildClientFailed {
                        source: Arc::new(err),
                    })?;
                Arc::new(ReqwestTransport::new(client))
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                config,
                default_headers,
                stack: self.stack,
                transport,
            }),
        })
    }
}

impl Client {
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Sends a request and waits for the buffered response.
    ///
    /// # Errors
    ///
    /// Returns a build error for invalid URLs or headers, a body error for
    /// failed body preparation, or the error the middleware chain or
    /// transport surfaced.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<Response> {
        let request = self.build_request(method, path, options)?;
        self.inner
            .stack
            .run(self.inner.transport.as_ref(), request)
            .await
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn get(&self, path: &str, options: RequestOptions) -> ClientResult<Response> {
        self.request(Method::GET, path, options).await
    }

    /// Sends a POST request.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn post(&self, path: &str, options: RequestOptions) -> ClientResult<Response> {
        self.request(Method::POST, path, options).await
    }

    /// Sends a PUT request.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn put(&self, path: &str, options: RequestOptions) -> ClientResult<Response> {
        self.request(Method::PUT, path, options).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn delete(&self, path: &str, options: RequestOptions) -> ClientResult<Response> {
        self.request(Method::DELETE, path, options).await
    }

    /// Sends a PATCH request.
    ///
    /// # Errors
    ///
    /// See [`Client::request`].
    pub async fn patch(&self, path: &str, options: RequestOptions) -> ClientResult<Response> {
        self.request(Method::PATCH, path, options).await
    }

    pub(crate) fn build_request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<Request> {
        let prepared = prepare_body(&options)?;
        let RequestOptions {
            headers,
            query,
            timeout,
            auth,
            cookies,
            ..
        } = options;

        let mut url = build_url(self.inner.config.base_url.as_ref(), path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (key, value)));
        }

        let mut request = Request::new(method, url);
        *request.headers_mut() = self.inner.default_headers.clone();
        for (name, value) in &headers {
            insert_header(request.headers_mut(), name, value)?;
        }
        if let Some(prepared) = &prepared
            && let Some(content_type) = &prepared.content_type
        {
            insert_header(request.headers_mut(), "content-type", content_type)?;
        }

        if let Some(auth) = auth.as_ref().or_else(|| self.inner.config.auth.as_ref()) {
            request
                .headers_mut()
                .insert(header::AUTHORIZATION, auth_header(auth)?);
        }

        if !cookies.is_empty() {
            let rendered = cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            insert_header(request.headers_mut(), "cookie", &rendered)?;
        }

        if let Some(prepared) = prepared {
            request.set_body(prepared.bytes);
        }
        request.set_timeout(timeout.unwrap_or(self.inner.config.timeout));

        Ok(request)
    }
}

/// Joins `path` onto the base URL, trimming duplicate slashes; absolute
/// URLs pass through when no base is configured.
pub(crate) fn build_url(base: Option<&Url>, path: &str) -> ClientResult<Url> {
    let raw = base.map_or_else(
        || path.to_owned(),
        |base| {
            format!(
                "{}/{}",
                base.as_str().trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        },
    );
    Url::parse(&raw).map_err(|err| {
        BuildError::InvalidUrl {
            url: raw,
            source: err,
        }
        .into()
    })
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> ClientResult<()> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|_err| BuildError::InvalidHeaderName {
            name: name.to_owned(),
        })?;
    let header_value =
        HeaderValue::from_str(value).map_err(|_err| BuildError::InvalidHeaderValue {
            name: name.to_owned(),
        })?;
    headers.insert(header_name, header_value);
    Ok(())
}

fn auth_header(auth: &Auth) -> ClientResult<HeaderValue> {
    let value = match auth {
        Auth::Basic { username, password } => {
            let token = format!("{username}:{password}");
            let encoded = base64::engine::general_purpose::STANDARD.encode(token.as_bytes());
            format!("Basic {encoded}")
        }
        Auth::Bearer { token } => format!("Bearer {token}"),
    };
    HeaderValue::from_str(&value).map_err(|_err| {
        BuildError::InvalidHeaderValue {
            name: "authorization".to_owned(),
        }
        .into()
    })
}
