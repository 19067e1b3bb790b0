//! HTTP transport for the delivery backend.
//!
//! `ApiClient` owns the bearer credential that every outgoing request
//! carries. The session store is the only writer of that credential; the
//! resource modules below add typed endpoint methods on top of the generic
//! verbs.

pub mod auth;
pub mod deliveries;
pub mod push;
pub mod shipments;
pub mod wallet;

use std::sync::{PoisonError, RwLock};
use std::time::Instant;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;
use crate::models::user::TokenPair;
use crate::observability::metrics::Metrics;

pub const PAGE_SIZE: u32 = 20;

/// `{ "data": T }` wrapper used by detail and mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Paginated collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    site_root: String,
    push_token_path: String,
    credential: RwLock<Option<TokenPair>>,
    metrics: Metrics,
}

impl ApiClient {
    pub fn new(base_url: &str, metrics: Metrics) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let site_root = base_url.clone();

        Ok(Self {
            http,
            base_url,
            site_root,
            push_token_path: push::DEFAULT_PUSH_TOKEN_PATH.to_string(),
            credential: RwLock::new(None),
            metrics,
        })
    }

    /// Points endpoints that live outside the versioned API root at `root`.
    pub fn with_site_root(mut self, root: &str, push_token_path: &str) -> Self {
        self.site_root = root.trim_end_matches('/').to_string();
        self.push_token_path = push_token_path.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn set_tokens(&self, tokens: TokenPair) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    /// Swaps in `next` only while `expected` is still the installed
    /// credential. Returns whether the swap happened.
    pub fn replace_tokens_if(&self, expected: &TokenPair, next: Option<TokenPair>) -> bool {
        let mut credential = self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if credential.as_ref() != Some(expected) {
            return false;
        }

        *credential = next;
        true
    }

    pub fn clear_tokens(&self) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|tokens| tokens.access)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.get_query(path, &[]).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let body = self.send(Method::GET, url, query, None::<&()>).await?;
        decode(&body)
    }

    pub async fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let body = self.send(Method::POST, url, &[], Some(payload)).await?;
        decode(&body)
    }

    pub async fn put<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let body = self.send(Method::PUT, url, &[], Some(payload)).await?;
        decode(&body)
    }

    pub async fn patch<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let body = self.send(Method::PATCH, url, &[], Some(payload)).await?;
        decode(&body)
    }

    /// Deletes a resource. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url(path);
        self.send(Method::DELETE, url, &[], None::<&()>).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join(&self.base_url, path)
    }

    fn site_url(&self, path: &str) -> String {
        join(&self.site_root, path)
    }

    async fn send<B>(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        payload: Option<&B>,
    ) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let method_label = method.as_str().to_string();
        let start = Instant::now();

        let result = self.execute(method, &url, query, payload).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ClientError::Api { .. }) => "rejected",
            Err(_) => "error",
        };
        self.metrics
            .api_requests_total
            .with_label_values(&[&method_label, outcome])
            .inc();
        self.metrics
            .api_request_latency_seconds
            .with_label_values(&[&method_label])
            .observe(start.elapsed().as_secs_f64());

        debug!(method = %method_label, url = %url, outcome, "api request finished");
        result
    }

    async fn execute<B>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        payload: Option<&B>,
    ) -> Result<Vec<u8>, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.http.request(method, url);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(access) = self.access_token() {
            request = request.header(AUTHORIZATION, format!("Bearer {access}"));
        }

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_response_body(status.as_u16(), &body));
        }

        Ok(body.to_vec())
    }
}

fn join(root: &str, path: &str) -> String {
    format!("{}/{}", root, path.trim_start_matches('/'))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|err| ClientError::Decode(err.to_string()))
}
