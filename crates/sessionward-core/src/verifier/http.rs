//! Credential verifier backed by an HTTPS JSON API.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST auth/login` with `{"email", "password"}`
//! - `POST auth/refresh` with `{"refreshToken"}`
//!
//! Both answer with the `LoginResponse` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Serialize;
use tracing::debug;

use super::{ApiError, CredentialVerifier, LoginGrant, LoginResponse};
use crate::error::AuthError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpVerifier {
    client: Client,
    base_url: String,
}

impl HttpVerifier {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<LoginGrant, ApiError> {
        let url = self.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let envelope: LoginResponse = response.json().await?;
        Self::into_grant(envelope)
    }

    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    fn into_grant(envelope: LoginResponse) -> Result<LoginGrant, ApiError> {
        match (envelope.success, envelope.data) {
            (true, Some(data)) => Ok(data.into()),
            (_, _) => Err(ApiError::from_message(envelope.message)),
        }
    }
}

#[async_trait]
impl CredentialVerifier for HttpVerifier {
    async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError> {
        Ok(self
            .post("auth/login", &LoginRequest { email, password })
            .await?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<LoginGrant, AuthError> {
        Ok(self
            .post("auth/refresh", &RefreshRequest { refresh_token })
            .await?)
    }
}
