//! Reqwest wrapper applying the session interceptor.
//!
//! Native and test harness clients use this directly; the browser build
//! applies the same interceptor around its fetch layer.

use http::HeaderMap;
use std::sync::Arc;
use url::Url;

use crate::api::ApiError;
use crate::interceptor::{RequestBody, SessionInterceptor};

/// HTTP client that routes every dispatch through the session interceptor.
pub struct SessionHttpClient {
    http: reqwest::Client,
    base_url: Url,
    interceptor: Arc<SessionInterceptor>,
}

impl SessionHttpClient {
    /// Creates a new client against the given API base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: Url, interceptor: Arc<SessionInterceptor>) -> Self {
        Self {
            http,
            base_url,
            interceptor,
        }
    }

    /// Issues a GET request.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be sent.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.join(path)?;
        let mut headers = HeaderMap::new();
        let sent_bearer = self.interceptor.on_request(&mut headers, RequestBody::Json);

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        self.interceptor
            .on_response(path, sent_bearer, response.status(), response.headers());
        Ok(response)
    }

    /// Issues a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be sent.
    pub async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.join(path)?;
        let mut headers = HeaderMap::new();
        let sent_bearer = self.interceptor.on_request(&mut headers, RequestBody::Json);

        let response = self
            .http
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        self.interceptor
            .on_response(path, sent_bearer, response.status(), response.headers());
        Ok(response)
    }

    /// Issues a POST request with a multipart body.
    ///
    /// The content type is left for the transport, which sets the multipart
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be sent.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.join(path)?;
        let mut headers = HeaderMap::new();
        let sent_bearer = self
            .interceptor
            .on_request(&mut headers, RequestBody::Multipart);

        let response = self
            .http
            .post(url)
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        self.interceptor
            .on_response(path, sent_bearer, response.status(), response.headers());
        Ok(response)
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::transport(format!("Invalid URL: {e}")))
    }
}
