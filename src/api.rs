// Authorized catalog client. An `ApiClient` only exists after a successful
// login, so every request it sends carries the bearer token. The proposal
// and acquisition submitters borrow one instead of logging in themselves.

use crate::config::Settings;
use crate::credentials::Credentials;
use crate::error::{CatalogError, Result};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;

pub const LOGIN_PATH: [&str; 2] = ["auth", "login"];

/// Success body of the login endpoint. Only the token id is used.
#[derive(Deserialize, Debug)]
struct LoginResponse {
    id: String,
}

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    headers: HeaderMap,
}

impl ApiClient<HttpTransport> {
    /// Read the configured secrets file and log in against the configured backend.
    pub fn connect(settings: &Settings) -> Result<Self> {
        let credentials = Credentials::from_file(&settings.secrets_path)?;
        let transport = HttpTransport::new(&settings.base_url)?;
        ApiClient::login(transport, &credentials)
    }
}

impl<T: Transport> ApiClient<T> {
    /// Exchange credentials for a bearer token. Any non-success status is an
    /// authentication failure, whatever the shape of the body.
    pub fn login(transport: T, credentials: &Credentials) -> Result<Self> {
        let body = serde_json::to_value(credentials).map_err(|source| CatalogError::Malformed {
            origin: "login request".into(),
            source,
        })?;
        let res = transport.send(ApiRequest::post(&LOGIN_PATH, body))?;
        if !res.status.is_success() {
            return Err(CatalogError::Authentication(res.message()));
        }
        let login: LoginResponse = res.json().map_err(|_| {
            CatalogError::Authentication("login response carried no token id".into())
        })?;
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", login.id)).map_err(|_| {
            CatalogError::Authentication("token is not a valid header value".into())
        })?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        tracing::info!("auth token fetched from {}", transport.base_url());
        Ok(ApiClient { transport, headers })
    }

    /// The `Authorization: Bearer <token>` header sent with every request.
    pub fn auth_headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn get(&self, segments: &[&str]) -> Result<ApiResponse> {
        self.transport
            .send(ApiRequest::get(segments).with_headers(self.headers.clone()))
    }

    pub fn post(&self, segments: &[&str], body: Value) -> Result<ApiResponse> {
        self.transport
            .send(ApiRequest::post(segments, body).with_headers(self.headers.clone()))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }
}
