//! JSON request contract.
//!
//! The executor lives in the infrastructure crate; this module defines what a
//! request looks like and what every executor must guarantee:
//!
//! - `Content-Type: application/json` unless the caller overrides it
//! - GET requests never carry a body
//! - a non-2xx response is `PortalError::Http` with the status code and the
//!   response text (or the reason phrase when the body is empty)
//! - an empty success body decodes as `{}`

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP methods supported by the portal client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method, headers and optional JSON body of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl RequestOptions {
    /// A plain GET request.
    pub fn get() -> Self {
        Self::default()
    }

    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Adds a header. A later header with the same name (ignoring case)
    /// replaces the earlier one.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds `Authorization: Bearer {token}`.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token))
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The body that will actually be sent; always `None` for GET.
    pub fn effective_body(&self) -> Option<&Value> {
        match self.method {
            HttpMethod::Get => None,
            _ => self.body.as_ref(),
        }
    }

    /// The Content-Type that will be sent.
    pub fn content_type(&self) -> &str {
        self.header("Content-Type").unwrap_or(CONTENT_TYPE_JSON)
    }
}

/// Executes JSON requests.
#[async_trait::async_trait]
pub trait JsonClient: Send + Sync {
    /// Sends the request and returns the decoded JSON body.
    async fn send(&self, url: &str, options: RequestOptions) -> Result<Value>;
}

/// Sends a request and decodes the body into `T`.
pub async fn send_json<T: DeserializeOwned>(
    client: &dyn JsonClient,
    url: &str,
    options: RequestOptions,
) -> Result<T> {
    let value = client.send(url, options).await?;
    Ok(serde_json::from_value(value)?)
}

/// `GET url` decoded into `T`.
pub async fn get_json<T: DeserializeOwned>(client: &dyn JsonClient, url: &str) -> Result<T> {
    send_json(client, url, RequestOptions::get()).await
}

/// Same as [`send_json`] with `Authorization: Bearer {token}` added.
pub async fn send_auth_json<T: DeserializeOwned>(
    client: &dyn JsonClient,
    url: &str,
    token: &str,
    options: RequestOptions,
) -> Result<T> {
    send_json(client, url, options.with_bearer(token)).await
}

/// Appends `key=value` to `url`, choosing `&` when the URL already has a
/// query string and `?` otherwise. The value is appended as given.
pub fn append_query_param(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, key, value)
}
