use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use crate::error::ApiError;

/// Minimal TMC server client used to verify login credentials.
#[derive(Debug, Clone)]
pub struct TmcClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Course {
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

impl TmcClient {
    pub fn new(server_address: &str) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("tmc-cli/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: server_address.trim_end_matches('/').to_string(),
        })
    }

    /// List the courses visible to the given user.
    ///
    /// Fails with [`ApiError::Unauthorized`] when the server rejects the
    /// credentials.
    pub async fn list_courses(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Vec<Course>, ApiError> {
        let url = format!("{}/api/v8/core/courses", self.base_url);
        let response = self
            .client
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            status if !status.is_success() => Err(ApiError::Status(status)),
            _ => Ok(response.json().await?),
        }
    }
}
